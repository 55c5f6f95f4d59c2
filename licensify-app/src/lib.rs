//! Licensify App - Session state, routing and page views
//!
//! This crate holds everything the dashboard does between the HTTP clients in
//! licensify-client and a presentation surface such as the CLI:
//!
//! - The session store, its persisted snapshot and change notifications
//! - The static role-gated route table
//! - One view per page with client-side search, filters and pagination
//! - The login flow and the layout shell that mounts pages

pub mod layout;
pub mod login;
pub mod routing;
pub mod session;
pub mod views;

pub use layout::{Dashboard, Navigation, Page};
pub use login::{LoginFlow, LoginStage};
pub use routing::{AppRoute, NavItem, RouteDecision, RouteTable};
pub use session::{
    CommittedSession, CredentialDraft, CredentialField, FileSessionStorage, MemorySessionStorage,
    PersistedSession, Session, SessionPersistence, SessionSnapshot, SessionStore,
};
pub use views::{
    AdminRequestsView, DialogAction, DialogState, LicensesView, MutationOutcome, MyLicensesView,
    OwnedLicenseRow, Pagination, RequestTab, RequestsView, StatusFilter, Submission,
};

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Core error: {0}")]
    Core(#[from] licensify_core::LicensifyError),

    #[error("Login failed: {message}")]
    Login { stage: LoginStage, message: String },

    #[error("Permission error: {message}")]
    Permission { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    /// Create a login error for the given stage
    pub fn login<S: Into<String>>(stage: LoginStage, message: S) -> Self {
        Self::Login {
            stage,
            message: message.into(),
        }
    }

    /// Create a permission error
    pub fn permission<S: Into<String>>(message: S) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Message suitable for a blocking alert
    pub fn user_message(&self) -> String {
        match self {
            Self::Login { message, .. } => message.clone(),
            Self::Core(e) => e.to_string(),
            Self::Permission { message }
            | Self::NotFound { message }
            | Self::InvalidInput { message } => message.clone(),
        }
    }
}
