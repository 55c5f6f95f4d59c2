//! HTTP clients for the services licensify talks to
//!
//! - [`BackendClient`]: the license backend (inventory, requests, approvals, login)
//! - [`FirebaseIdentityClient`]: email/password sign-in at the identity provider
//!
//! Both sit behind traits ([`LicenseBackend`], [`IdentityProvider`]) so the
//! application layer can be exercised against in-memory fakes.

pub mod backend;
pub mod http;
pub mod identity;

pub use backend::{BackendClient, BackendLogin, LicenseBackend, RequestDecision};
pub use http::ApiClientConfig;
pub use identity::{FirebaseIdentityClient, IdentityProvider, VerifiedIdentity};
