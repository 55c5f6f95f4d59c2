//! Licensify Core - Shared configuration, errors, logging and domain types
//!
//! Every other licensify crate builds on the definitions in this module

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
