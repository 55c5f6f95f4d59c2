//! Configuration management

use crate::error::{LicensifyError, LicensifyResult};
use crate::types::{ApiConfig, IdentityConfig, LicensifyConfig, StorageConfig, ViewConfig};

use std::path::{Path, PathBuf};

/// Upper bound for `views.expiring_soon_days`, ten years
pub const MAX_EXPIRING_SOON_DAYS: i64 = 3650;

impl Default for LicensifyConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:3000".to_string(),
                timeout_seconds: 30,
                user_agent: format!("licensify/{}", env!("CARGO_PKG_VERSION")),
            },
            identity: IdentityConfig {
                provider: "firebase".to_string(),
                base_url: "https://identitytoolkit.googleapis.com".to_string(),
                api_key: None,
                token_lifetime_seconds: 3600,
            },
            storage: StorageConfig {
                data_dir: "~/.licensify".to_string(),
                session_key: "auth-storage".to_string(),
            },
            views: ViewConfig {
                licenses_page_size: 10,
                my_licenses_page_size: 12,
                requests_page_size: 5,
                admin_requests_page_size: 5,
                expiring_soon_days: 7,
            },
        }
    }
}

impl LicensifyConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> LicensifyResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LicensifyError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: LicensifyConfig =
            toml::from_str(&content).map_err(|e| LicensifyError::Config {
                message: format!("Failed to parse config: {}", e),
                source: Some(Box::new(e)),
                context: crate::ErrorContext::new("config")
                    .with_operation("parse_toml")
                    .with_suggestion("Check TOML syntax in config file"),
            })?;

        Ok(config)
    }

    /// Write configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> LicensifyResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| LicensifyError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| LicensifyError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Overlay values from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup, keyed by environment variable name
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("LICENSIFY_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Some(api_key) = lookup("LICENSIFY_IDENTITY_API_KEY") {
            self.identity.api_key = Some(api_key);
        }
        if let Some(base_url) = lookup("LICENSIFY_IDENTITY_BASE_URL") {
            self.identity.base_url = base_url;
        }
        if let Some(data_dir) = lookup("LICENSIFY_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> LicensifyResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(crate::config_error!("api.base_url must not be empty", "config"));
        }

        url::Url::parse(&self.api.base_url).map_err(|e| LicensifyError::Config {
            message: format!("api.base_url is not a valid URL: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Use an absolute URL such as https://licenses.example.com"),
        })?;

        if self.api.timeout_seconds == 0 {
            return Err(LicensifyError::Config {
                message: "api.timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: crate::ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.timeout_seconds to a positive value"),
            });
        }

        let page_sizes = [
            ("views.licenses_page_size", self.views.licenses_page_size),
            ("views.my_licenses_page_size", self.views.my_licenses_page_size),
            ("views.requests_page_size", self.views.requests_page_size),
            (
                "views.admin_requests_page_size",
                self.views.admin_requests_page_size,
            ),
        ];
        for (key, size) in page_sizes {
            if size == 0 {
                return Err(LicensifyError::Config {
                    message: format!("{} must be greater than 0", key),
                    source: None,
                    context: crate::ErrorContext::new("config")
                        .with_operation("validate")
                        .with_suggestion("Page sizes must be positive"),
                });
            }
        }

        if !(0..=MAX_EXPIRING_SOON_DAYS).contains(&self.views.expiring_soon_days) {
            return Err(LicensifyError::Config {
                message: format!(
                    "views.expiring_soon_days must be between 0 and {}",
                    MAX_EXPIRING_SOON_DAYS
                ),
                source: None,
                context: crate::ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("The default warning window is 7 days"),
            });
        }

        if self.storage.session_key.trim().is_empty() {
            return Err(crate::config_error!(
                "storage.session_key must not be empty",
                "config"
            ));
        }

        Ok(())
    }

    /// Data directory with a leading `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.storage.data_dir)
    }

    /// Location of the persisted session record
    pub fn session_file_path(&self) -> PathBuf {
        self.data_dir()
            .join(format!("{}.json", self.storage.session_key))
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
        _ => PathBuf::from(path),
    }
}
