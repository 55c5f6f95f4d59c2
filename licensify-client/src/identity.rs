//! Identity provider client
//!
//! Exchanges an email/password pair for a bearer token and refresh token using
//! the Firebase Identity Toolkit password sign-in endpoint.

use async_trait::async_trait;
use licensify_core::{ErrorContext, LicensifyError, LicensifyResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::{create_http_client, transport_error, ApiClientConfig};

/// Successful sign-in at the identity provider
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub id_token: String,
    pub refresh_token: String,
    pub email: String,
    pub display_name: String,
    pub expires_in_seconds: u64,
    /// Provider-side user id; the backend assigns the canonical one
    pub local_id: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> LicensifyResult<VerifiedIdentity>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    local_id: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

pub struct FirebaseIdentityClient {
    client: reqwest::Client,
    config: ApiClientConfig,
    api_key: Option<String>,
    default_lifetime_seconds: u64,
}

impl FirebaseIdentityClient {
    pub fn new(
        config: ApiClientConfig,
        api_key: Option<String>,
        default_lifetime_seconds: u64,
    ) -> LicensifyResult<Self> {
        let client = create_http_client(&config)?;

        info!("Created identity provider client for {}", config.base_url);

        Ok(Self {
            client,
            config,
            api_key,
            default_lifetime_seconds,
        })
    }

    pub fn from_config(
        config: &licensify_core::IdentityConfig,
        user_agent: &str,
    ) -> LicensifyResult<Self> {
        Self::new(
            ApiClientConfig::identity(config, user_agent),
            config.api_key.clone(),
            config.token_lifetime_seconds,
        )
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityClient {
    async fn sign_in(&self, email: &str, password: &str) -> LicensifyResult<VerifiedIdentity> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                licensify_core::config_error!("identity.api_key is not configured", "identity")
            })?;

        let mut url = self.config.endpoint("/v1/accounts:signInWithPassword")?;
        url.query_pairs_mut().append_pair("key", api_key);

        debug!(email, "Signing in at identity provider");

        let response = self
            .client
            .post(url)
            .json(&SignInBody {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| transport_error(e, "sign_in"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("sign-in rejected")
                        .to_string()
                });
            return Err(LicensifyError::Identity {
                message,
                context: ErrorContext::new("identity_client")
                    .with_operation("sign_in")
                    .with_metadata("status", status.as_str())
                    .with_suggestion("Check the email and password"),
            });
        }

        let body: SignInResponse = response.json().await.map_err(|e| LicensifyError::Identity {
            message: format!("Malformed sign-in response: {}", e),
            context: ErrorContext::new("identity_client").with_operation("sign_in"),
        })?;

        let expires_in_seconds = body
            .expires_in
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(self.default_lifetime_seconds);

        Ok(VerifiedIdentity {
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            email: body.email.unwrap_or_else(|| email.to_string()),
            display_name: body.display_name.unwrap_or_default(),
            expires_in_seconds,
            local_id: body.local_id.unwrap_or_default(),
        })
    }
}
