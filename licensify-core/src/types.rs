//! Core data type definitions
//!
//! Domain records are client-side projections of backend resources. Field
//! names on the wire follow the backend verbatim (`_id`, `licenseName`, ...).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned to a user by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Catalog entry: a license type with unassigned seats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "count", default)]
    pub available_count: u32,
    #[serde(rename = "image", default)]
    pub image_url: Option<String>,
}

impl License {
    /// The catalog is grouped by license name, so the id doubles as the name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A license assigned to the current user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedLicense {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "image", default)]
    pub image_url: Option<String>,
}

impl OwnedLicense {
    /// Parse the expiry as either an RFC 3339 timestamp or a bare date
    pub fn expiry_date(&self) -> Option<NaiveDate> {
        let raw = self.expiry.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc).date_naive());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    /// Classify against `today`. A window past the end of the calendar covers
    /// every later date.
    pub fn expiry_status(&self, today: NaiveDate, soon_days: i64) -> ExpiryStatus {
        let soon_until = chrono::Duration::try_days(soon_days.max(0))
            .and_then(|window| today.checked_add_signed(window))
            .unwrap_or(NaiveDate::MAX);
        match self.expiry_date() {
            None => ExpiryStatus::Unknown,
            Some(date) if date < today => ExpiryStatus::Expired,
            Some(date) if date < soon_until => ExpiryStatus::ExpiringSoon,
            Some(_) => ExpiryStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Active,
    ExpiringSoon,
    Expired,
    Unknown,
}

/// Lifecycle of a license request. Transitions happen only on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Accepted => write!(f, "accepted"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(format!("Unknown request status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestComment {
    pub user: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRequest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "licenseName", default)]
    pub license_name: String,
    #[serde(rename = "image", default)]
    pub image_url: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub comments: Vec<RequestComment>,
    /// Requesting user, present on the admin listing
    #[serde(rename = "user", default)]
    pub user_id: Option<String>,
    #[serde(rename = "licenseId", default)]
    pub license_id: Option<String>,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicensifyConfig {
    pub api: ApiConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub views: ViewConfig,
}

/// Backend REST API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Identity provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub provider: String,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Used when the provider does not report a token lifetime
    pub token_lifetime_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Fixed name of the persisted session record
    pub session_key: String,
}

/// Page sizes and display thresholds for the list views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub licenses_page_size: usize,
    pub my_licenses_page_size: usize,
    pub requests_page_size: usize,
    pub admin_requests_page_size: usize,
    pub expiring_soon_days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(expiry: &str) -> OwnedLicense {
        OwnedLicense {
            id: "l1".into(),
            name: "JetBrains".into(),
            expiry: expiry.into(),
            price: 10.0,
            image_url: None,
        }
    }

    #[test]
    fn test_license_wire_format() {
        let json = r#"{"_id":"Figma","price":12.5,"count":3,"image":"https://img/figma.png"}"#;
        let license: License = serde_json::from_str(json).unwrap();
        assert_eq!(license.id, "Figma");
        assert_eq!(license.display_name(), "Figma");
        assert_eq!(license.available_count, 3);
        assert_eq!(license.image_url.as_deref(), Some("https://img/figma.png"));
    }

    #[test]
    fn test_request_wire_format() {
        let json = r#"{
            "_id": "r1",
            "licenseName": "Slack",
            "status": "pending",
            "comments": [{"user": "alice", "message": "please"}],
            "user": "u1",
            "licenseId": "lic-9"
        }"#;
        let request: LicenseRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.comments.len(), 1);
        assert_eq!(request.user_id.as_deref(), Some("u1"));
        assert_eq!(request.license_id.as_deref(), Some("lic-9"));
    }

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" user ".parse::<Role>().unwrap(), Role::User);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_expiry_status() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

        assert_eq!(owned("2025-06-01").expiry_status(today, 7), ExpiryStatus::Expired);
        assert_eq!(owned("2025-06-12").expiry_status(today, 7), ExpiryStatus::ExpiringSoon);
        assert_eq!(
            owned("2025-06-16T23:00:00Z").expiry_status(today, 7),
            ExpiryStatus::ExpiringSoon
        );
        assert_eq!(owned("2025-06-17").expiry_status(today, 7), ExpiryStatus::Active);
        assert_eq!(owned("soon").expiry_status(today, 7), ExpiryStatus::Unknown);
    }

    #[test]
    fn test_expiry_window_out_of_calendar_range() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

        assert_eq!(
            owned("2999-01-01").expiry_status(today, i64::MAX),
            ExpiryStatus::ExpiringSoon
        );
        assert_eq!(
            owned("2025-06-01").expiry_status(today, i64::MAX),
            ExpiryStatus::Expired
        );
        assert_eq!(owned("2025-06-10").expiry_status(today, i64::MIN), ExpiryStatus::Active);
        assert_eq!(
            owned("2025-06-11").expiry_status(NaiveDate::MAX, 7),
            ExpiryStatus::Expired
        );
    }
}
