//! License backend REST client
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/licenses/getUnassignedLicenses` | Catalog of licenses with free seats |
//! | POST   | `/licenses/createRequest` | Request a license |
//! | POST   | `/licenses/getMyLicenses` | Licenses assigned to a user |
//! | GET    | `/licenses/getAllPendingRequests` | Every request (admin) |
//! | PATCH  | `/licenses/updateRequests` | Accept or reject a request |
//! | POST   | `/licenses/myRequests` | Requests made by a user |
//! | POST   | `/user/login` | Exchange an identity token for role + user id |
//!
//! Every call fetches or replaces a whole collection; there are no pagination
//! or filter parameters.

use async_trait::async_trait;
use licensify_core::{
    ErrorContext, License, LicenseRequest, LicensifyError, LicensifyResult, OwnedLicense,
    RequestStatus,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::RwLock;
use tracing::{debug, info};

use crate::http::{create_http_client, handle_response_error, transport_error, ApiClientConfig};

/// Admin decision on a pending request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDecision {
    #[serde(rename = "requestId")]
    pub request_id: String,
    /// The user who made the request
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "licenseId")]
    pub license_id: Option<String>,
    pub status: RequestStatus,
    pub comment: String,
    #[serde(rename = "adminId")]
    pub admin_id: String,
}

/// Result of exchanging an identity token at the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendLogin {
    #[serde(rename = "_id", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Serialize)]
struct CreateRequestBody<'a> {
    user_id: &'a str,
    #[serde(rename = "licenseName")]
    license_name: &'a str,
    comment: &'a str,
}

#[derive(Serialize)]
struct UserBody<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    token: &'a str,
}

/// Operations offered by the license backend
#[async_trait]
pub trait LicenseBackend: Send + Sync {
    /// Catalog of licenses that still have unassigned seats
    async fn get_unassigned_licenses(&self) -> LicensifyResult<Vec<License>>;

    /// File a license request on behalf of a user; the comment may be empty
    async fn create_request(
        &self,
        user_id: &str,
        license_name: &str,
        comment: &str,
    ) -> LicensifyResult<()>;

    async fn get_my_licenses(&self, user_id: &str) -> LicensifyResult<Vec<OwnedLicense>>;

    /// All requests visible to an admin. Despite the name this includes
    /// requests that were already processed.
    async fn get_all_pending_requests(&self) -> LicensifyResult<Vec<LicenseRequest>>;

    async fn update_request(&self, decision: &RequestDecision) -> LicensifyResult<()>;

    async fn my_requests(&self, user_id: &str) -> LicensifyResult<Vec<LicenseRequest>>;

    async fn login(&self, token: &str) -> LicensifyResult<BackendLogin>;

    /// Token sent as a bearer credential on subsequent calls
    fn set_access_token(&self, token: Option<String>);
}

/// reqwest-backed [`LicenseBackend`]
pub struct BackendClient {
    client: reqwest::Client,
    config: ApiClientConfig,
    access_token: RwLock<Option<String>>,
}

impl BackendClient {
    pub fn new(config: ApiClientConfig) -> LicensifyResult<Self> {
        let client = create_http_client(&config)?;

        info!("Created license backend client for {}", config.base_url);

        Ok(Self {
            client,
            config,
            access_token: RwLock::new(None),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self
            .access_token
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
        operation: &str,
    ) -> LicensifyResult<reqwest::Response> {
        let url = self.config.endpoint(path)?;
        debug!(%method, %url, "Calling license backend");

        let mut request = self.authorize(self.client.request(method, url));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, operation))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, operation).await);
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> LicensifyResult<T> {
        response.json::<T>().await.map_err(|e| LicensifyError::Backend {
            status: 200,
            message: format!("Malformed response body: {}", e),
            context: ErrorContext::new("backend_client").with_operation(operation),
        })
    }

    fn body<T: Serialize>(value: &T) -> LicensifyResult<serde_json::Value> {
        Ok(serde_json::to_value(value)?)
    }
}

#[async_trait]
impl LicenseBackend for BackendClient {
    async fn get_unassigned_licenses(&self) -> LicensifyResult<Vec<License>> {
        let op = "get_unassigned_licenses";
        let response = self
            .send(reqwest::Method::GET, "/licenses/getUnassignedLicenses", None, op)
            .await?;
        let licenses: Vec<License> = Self::decode(response, op).await?;
        debug!(count = licenses.len(), "Fetched license catalog");
        Ok(licenses)
    }

    async fn create_request(
        &self,
        user_id: &str,
        license_name: &str,
        comment: &str,
    ) -> LicensifyResult<()> {
        let body = Self::body(&CreateRequestBody {
            user_id,
            license_name,
            comment,
        })?;
        self.send(
            reqwest::Method::POST,
            "/licenses/createRequest",
            Some(body),
            "create_request",
        )
        .await?;
        info!(license = license_name, "License request submitted");
        Ok(())
    }

    async fn get_my_licenses(&self, user_id: &str) -> LicensifyResult<Vec<OwnedLicense>> {
        let op = "get_my_licenses";
        let body = Self::body(&UserBody { user_id })?;
        let response = self
            .send(reqwest::Method::POST, "/licenses/getMyLicenses", Some(body), op)
            .await?;
        Self::decode(response, op).await
    }

    async fn get_all_pending_requests(&self) -> LicensifyResult<Vec<LicenseRequest>> {
        let op = "get_all_pending_requests";
        let response = self
            .send(reqwest::Method::GET, "/licenses/getAllPendingRequests", None, op)
            .await?;
        let requests: Option<Vec<LicenseRequest>> = Self::decode(response, op).await?;
        Ok(requests.unwrap_or_default())
    }

    async fn update_request(&self, decision: &RequestDecision) -> LicensifyResult<()> {
        let body = Self::body(decision)?;
        self.send(
            reqwest::Method::PATCH,
            "/licenses/updateRequests",
            Some(body),
            "update_request",
        )
        .await?;
        info!(
            request_id = %decision.request_id,
            status = %decision.status,
            "Request decision recorded"
        );
        Ok(())
    }

    async fn my_requests(&self, user_id: &str) -> LicensifyResult<Vec<LicenseRequest>> {
        let op = "my_requests";
        let body = Self::body(&UserBody { user_id })?;
        let response = self
            .send(reqwest::Method::POST, "/licenses/myRequests", Some(body), op)
            .await?;
        Self::decode(response, op).await
    }

    async fn login(&self, token: &str) -> LicensifyResult<BackendLogin> {
        let op = "login";
        let body = Self::body(&LoginBody { token })?;
        let response = self
            .send(reqwest::Method::POST, "/user/login", Some(body), op)
            .await?;
        Self::decode(response, op).await
    }

    fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_wire_format() {
        let decision = RequestDecision {
            request_id: "r1".into(),
            user_id: Some("u1".into()),
            license_id: Some("l1".into()),
            status: RequestStatus::Accepted,
            comment: "approved".into(),
            admin_id: "a1".into(),
        };
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "requestId": "r1",
                "userId": "u1",
                "licenseId": "l1",
                "status": "accepted",
                "comment": "approved",
                "adminId": "a1"
            })
        );
    }

    #[test]
    fn test_create_request_wire_format() {
        let body = BackendClient::body(&CreateRequestBody {
            user_id: "u1",
            license_name: "Figma",
            comment: "",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"user_id": "u1", "licenseName": "Figma", "comment": ""})
        );
    }
}
