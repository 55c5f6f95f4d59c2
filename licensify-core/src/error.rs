//! Error types shared by every licensify crate
//!
//! Provides structured error types with context and recovery suggestions.
//! Errors are never retried: every failure is reported once and the caller
//! degrades to a stale or empty view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type LicensifyResult<T> = Result<T, LicensifyError>;

/// Error context providing additional information for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for Licensify
#[derive(Error, Debug)]
pub enum LicensifyError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Backend returned HTTP {status}: {message}")]
    Backend {
        status: u16,
        message: String,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Identity provider error: {message}")]
    Identity {
        message: String,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl LicensifyError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            LicensifyError::Network { context, .. } => Some(context),
            LicensifyError::Backend { context, .. } => Some(context),
            LicensifyError::Authentication { context, .. } => Some(context),
            LicensifyError::Identity { context, .. } => Some(context),
            LicensifyError::Storage { context, .. } => Some(context),
            LicensifyError::Config { context, .. } => Some(context),
            LicensifyError::Validation { context, .. } => Some(context),
            LicensifyError::NotFound { context, .. } => Some(context),
            LicensifyError::Internal { context, .. } => Some(context),
            LicensifyError::Io(_) | LicensifyError::Serialization(_) => None,
        }
    }

    /// The server rejected the credentials we hold.
    ///
    /// Sessions are never expired locally, so this is the only signal that a
    /// restored session has gone stale.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LicensifyError::Authentication { .. })
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        match self {
            LicensifyError::Internal { .. } | LicensifyError::Storage { .. } => {
                error!(error_id = ?error_id, error = %self, "Internal error occurred");
            }
            LicensifyError::Config { .. } | LicensifyError::Validation { .. } => {
                error!(error_id = ?error_id, error = %self, "Configuration or validation error");
            }
            LicensifyError::Network { .. } | LicensifyError::Backend { .. } => {
                warn!(error_id = ?error_id, error = %self, "Request failed");
            }
            LicensifyError::Authentication { .. } => {
                warn!(error_id = ?error_id, error = %self, "Credentials rejected");
            }
            _ => {
                error!(error_id = ?error_id, error = %self, "Error occurred");
            }
        }
    }

    /// Recovery suggestions attached to the error, if any
    pub fn suggestions(&self) -> &[String] {
        self.context()
            .map(|c| c.recovery_suggestions.as_slice())
            .unwrap_or(&[])
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::LicensifyError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'licensify config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::LicensifyError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::LicensifyError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! network_error {
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::LicensifyError::Network {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check network connectivity and the configured base URL"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let context = ErrorContext::new("backend_client")
            .with_operation("get_my_licenses")
            .with_metadata("user_id", "u-1")
            .with_suggestion("Log in again");

        assert_eq!(context.component, "backend_client");
        assert_eq!(context.operation.as_deref(), Some("get_my_licenses"));
        assert_eq!(context.metadata.get("user_id"), Some(&"u-1".to_string()));
        assert_eq!(context.recovery_suggestions, vec!["Log in again"]);
        assert!(!context.error_id.is_empty());
    }

    #[test]
    fn test_unauthorized_detection() {
        let stale = LicensifyError::Authentication {
            message: "token expired".to_string(),
            context: ErrorContext::new("test"),
        };
        let backend = LicensifyError::Backend {
            status: 500,
            message: "boom".to_string(),
            context: ErrorContext::new("test"),
        };

        assert!(stale.is_unauthorized());
        assert!(!backend.is_unauthorized());
    }

    #[test]
    fn test_macros_attach_context() {
        let err = validation_error!("comment must not be blank", "comment", "admin_requests");
        match &err {
            LicensifyError::Validation { field, context, .. } => {
                assert_eq!(field.as_deref(), Some("comment"));
                assert_eq!(context.component, "admin_requests");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.suggestions().len(), 1);

        let err = config_error!("missing api key", "identity");
        assert!(err.to_string().contains("missing api key"));

        let io = LicensifyError::Io(std::io::Error::other("disk"));
        assert!(io.context().is_none());
        assert!(io.suggestions().is_empty());
    }
}
