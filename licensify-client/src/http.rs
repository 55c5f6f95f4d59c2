//! Shared HTTP plumbing for the API clients

use licensify_core::{ErrorContext, LicensifyError, LicensifyResult};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

/// Where a client sends requests and how long it waits
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_seconds: 30,
            user_agent: "licensify/1.0".to_string(),
        }
    }
}

impl ApiClientConfig {
    /// Configuration for the license backend
    pub fn backend(config: &licensify_core::ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout_seconds: config.timeout_seconds,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Configuration for the identity provider
    pub fn identity(config: &licensify_core::IdentityConfig, user_agent: &str) -> Self {
        Self {
            base_url: config.base_url.clone(),
            user_agent: user_agent.to_string(),
            ..Default::default()
        }
    }

    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> LicensifyResult<url::Url> {
        let base = format!("{}/", self.base_url.trim_end_matches('/'));
        let base = url::Url::parse(&base).map_err(|e| LicensifyError::Config {
            message: format!("Invalid base URL '{}': {}", self.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client")
                .with_operation("endpoint")
                .with_suggestion("Set api.base_url to an absolute URL"),
        })?;

        base.join(path.trim_start_matches('/'))
            .map_err(|e| LicensifyError::Config {
                message: format!("Invalid endpoint path '{}': {}", path, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("endpoint"),
            })
    }
}

/// reqwest client carrying the user agent and request timeout
pub(crate) fn create_http_client(config: &ApiClientConfig) -> LicensifyResult<reqwest::Client> {
    let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
        LicensifyError::Config {
            message: format!("Invalid user agent '{}': {}", config.user_agent, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client")
                .with_operation("create_client")
                .with_suggestion("Use printable ASCII in api.user_agent"),
        }
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, user_agent);

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| LicensifyError::Internal {
            message: format!("Could not build HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

/// Map a transport failure to a network error
pub(crate) fn transport_error(error: reqwest::Error, operation: &str) -> LicensifyError {
    LicensifyError::Network {
        message: format!("Request failed: {}", error),
        context: ErrorContext::new("http_client")
            .with_operation(operation)
            .with_suggestion("Check network connectivity and the configured base URL"),
        source: Some(Box::new(error)),
    }
}

/// Classify a non-success response; 401 and 403 mean the session token was refused
pub(crate) async fn handle_response_error(
    response: reqwest::Response,
    operation: &str,
) -> LicensifyError {
    let status = response.status();
    let url = response.url().clone();

    let error_body = response.text().await.unwrap_or_default();
    let message = format!(
        "{} {}",
        url.path(),
        if error_body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error")
        } else {
            &error_body
        }
    );

    match status.as_u16() {
        401 | 403 => LicensifyError::Authentication {
            message,
            context: ErrorContext::new("api_client")
                .with_operation(operation)
                .with_suggestion("Your session may have expired; run 'licensify login' again"),
        },
        code => LicensifyError::Backend {
            status: code,
            message,
            context: ErrorContext::new("api_client")
                .with_operation(operation)
                .with_suggestion(match code {
                    404 => "Resource not found on the backend",
                    _ => "Check backend availability",
                }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let config = ApiClientConfig {
            base_url: "https://api.example.com/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint("/licenses/myRequests").unwrap().as_str(),
            "https://api.example.com/v1/licenses/myRequests"
        );

        let config = ApiClientConfig {
            base_url: "https://api.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint("user/login").unwrap().as_str(),
            "https://api.example.com/user/login"
        );
    }

    #[test]
    fn test_endpoint_rejects_relative_base() {
        let config = ApiClientConfig {
            base_url: "licenses".to_string(),
            ..Default::default()
        };
        assert!(config.endpoint("/user/login").is_err());
    }

    #[test]
    fn test_configs_follow_their_sections() {
        let api = licensify_core::ApiConfig {
            base_url: "https://licenses.example.com".to_string(),
            timeout_seconds: 5,
            user_agent: "licensify-test".to_string(),
        };
        let backend = ApiClientConfig::backend(&api);
        assert_eq!(backend.base_url, api.base_url);
        assert_eq!(backend.timeout_seconds, 5);
        assert_eq!(backend.user_agent, "licensify-test");

        let identity = ApiClientConfig::identity(
            &licensify_core::IdentityConfig {
                provider: "firebase".to_string(),
                base_url: "https://identitytoolkit.example.com".to_string(),
                api_key: None,
                token_lifetime_seconds: 3600,
            },
            "licensify-test",
        );
        assert_eq!(identity.base_url, "https://identitytoolkit.example.com");
        assert_eq!(identity.timeout_seconds, 30);
        assert_eq!(identity.user_agent, "licensify-test");
    }

    #[test]
    fn test_client_rejects_unprintable_user_agent() {
        let config = ApiClientConfig {
            user_agent: "licensify\n".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_http_client(&config),
            Err(LicensifyError::Config { .. })
        ));
        assert!(create_http_client(&ApiClientConfig::default()).is_ok());
    }
}
