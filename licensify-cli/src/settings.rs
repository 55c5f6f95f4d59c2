//! Configuration discovery and the `config` command

use anyhow::{Context, Result};
use licensify_core::{
    ErrorContext, LicensifyConfig, LicensifyError, LicensifyResult, MAX_EXPIRING_SOON_DAYS,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Load configuration from an explicit path or the default locations, then
/// overlay environment variables
pub fn load_config(config_path: Option<&PathBuf>) -> LicensifyResult<LicensifyConfig> {
    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            LicensifyConfig::from_file(path)?
        }
        None => match default_paths().into_iter().find(|path| path.exists()) {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                LicensifyConfig::from_file(&path)?
            }
            None => {
                info!("No configuration file found, using defaults");
                LicensifyConfig::default()
            }
        },
    };

    config.apply_env_overrides();
    Ok(config)
}

fn default_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|d| d.join("licensify").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".licensify").join("config.toml")),
        Some(PathBuf::from("licensify.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Where `config --init`, `--set` and `--reset` write
fn get_config_path(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("licensify").join("config.toml"))
        .context("Could not determine a configuration directory")
}

pub fn handle_config(
    explicit: Option<&PathBuf>,
    show: bool,
    init: bool,
    set: Option<String>,
    get: Option<String>,
    reset: bool,
    validate: bool,
) -> Result<()> {
    let config_path = get_config_path(explicit)?;

    if init {
        write_config(&LicensifyConfig::default(), &config_path)?;
        println!("✅ Configuration initialized at: {:?}", config_path);
        println!("📝 Set identity.api_key before running `licensify login`.");
    }

    if show {
        let config = load_config(explicit)?;
        println!("📋 Current configuration:");
        println!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to render configuration")?
        );
    }

    if reset {
        write_config(&LicensifyConfig::default(), &config_path)?;
        println!("🔄 Configuration reset to defaults at: {:?}", config_path);
    }

    if validate {
        let config = load_config(explicit)?;
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
    }

    if let Some(key_value) = set {
        let Some((key, value)) = key_value.split_once('=') else {
            return Err(LicensifyError::Config {
                message: "Invalid format. Use key=value format".to_string(),
                source: None,
                context: ErrorContext::new("config_set")
                    .with_suggestion("Example: --set api.base_url=https://licenses.example.com"),
            }
            .into());
        };
        let mut config = if config_path.exists() {
            LicensifyConfig::from_file(&config_path)?
        } else {
            LicensifyConfig::default()
        };
        set_config_value(&mut config, key.trim(), value.trim())?;
        write_config(&config, &config_path)?;
        println!("✅ Set {} = {}", key.trim(), value.trim());
    }

    if let Some(key) = get {
        let config = load_config(explicit)?;
        println!("{} = {}", key, get_config_value(&config, &key)?);
    }

    Ok(())
}

fn write_config(config: &LicensifyConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    config.save_to_file(path)?;
    Ok(())
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, kind: &str) -> LicensifyResult<T> {
    value.parse().map_err(|_| LicensifyError::Config {
        message: format!("Invalid {} value for {}: {}", kind, key, value),
        source: None,
        context: ErrorContext::new("config_set"),
    })
}

/// Update one dotted key
pub fn set_config_value(
    config: &mut LicensifyConfig,
    key: &str,
    value: &str,
) -> LicensifyResult<()> {
    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        ["api", "base_url"] => config.api.base_url = value.to_string(),
        ["api", "timeout_seconds"] => {
            config.api.timeout_seconds = parse_value(key, value, "integer")?
        }
        ["api", "user_agent"] => config.api.user_agent = value.to_string(),
        ["identity", "base_url"] => config.identity.base_url = value.to_string(),
        ["identity", "api_key"] => {
            config.identity.api_key = (!value.is_empty()).then(|| value.to_string())
        }
        ["identity", "token_lifetime_seconds"] => {
            config.identity.token_lifetime_seconds = parse_value(key, value, "integer")?
        }
        ["storage", "data_dir"] => config.storage.data_dir = value.to_string(),
        ["storage", "session_key"] => config.storage.session_key = value.to_string(),
        ["views", "licenses_page_size"] => {
            config.views.licenses_page_size = parse_value(key, value, "integer")?
        }
        ["views", "my_licenses_page_size"] => {
            config.views.my_licenses_page_size = parse_value(key, value, "integer")?
        }
        ["views", "requests_page_size"] => {
            config.views.requests_page_size = parse_value(key, value, "integer")?
        }
        ["views", "admin_requests_page_size"] => {
            config.views.admin_requests_page_size = parse_value(key, value, "integer")?
        }
        ["views", "expiring_soon_days"] => {
            let days: i64 = parse_value(key, value, "integer")?;
            if !(0..=MAX_EXPIRING_SOON_DAYS).contains(&days) {
                return Err(LicensifyError::Config {
                    message: format!(
                        "{} must be between 0 and {}, got {}",
                        key, MAX_EXPIRING_SOON_DAYS, days
                    ),
                    source: None,
                    context: ErrorContext::new("config_set"),
                });
            }
            config.views.expiring_soon_days = days;
        }
        _ => return Err(unknown_key(key, "config_set")),
    }
    Ok(())
}

pub fn get_config_value(config: &LicensifyConfig, key: &str) -> LicensifyResult<String> {
    let parts: Vec<&str> = key.split('.').collect();
    let value = match parts.as_slice() {
        ["api", "base_url"] => config.api.base_url.clone(),
        ["api", "timeout_seconds"] => config.api.timeout_seconds.to_string(),
        ["api", "user_agent"] => config.api.user_agent.clone(),
        ["identity", "provider"] => config.identity.provider.clone(),
        ["identity", "base_url"] => config.identity.base_url.clone(),
        ["identity", "api_key"] => match &config.identity.api_key {
            Some(_) => "<set>".to_string(),
            None => "<unset>".to_string(),
        },
        ["identity", "token_lifetime_seconds"] => {
            config.identity.token_lifetime_seconds.to_string()
        }
        ["storage", "data_dir"] => config.storage.data_dir.clone(),
        ["storage", "session_key"] => config.storage.session_key.clone(),
        ["views", "licenses_page_size"] => config.views.licenses_page_size.to_string(),
        ["views", "my_licenses_page_size"] => config.views.my_licenses_page_size.to_string(),
        ["views", "requests_page_size"] => config.views.requests_page_size.to_string(),
        ["views", "admin_requests_page_size"] => {
            config.views.admin_requests_page_size.to_string()
        }
        ["views", "expiring_soon_days"] => config.views.expiring_soon_days.to_string(),
        _ => return Err(unknown_key(key, "config_get")),
    };
    Ok(value)
}

fn unknown_key(key: &str, component: &str) -> LicensifyError {
    LicensifyError::Config {
        message: format!("Unknown configuration key: {}", key),
        source: None,
        context: ErrorContext::new(component)
            .with_suggestion("Use --show to see available configuration keys"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        handle_config(
            Some(&path),
            false,
            false,
            Some("views.requests_page_size=8".to_string()),
            None,
            false,
            false,
        )
        .unwrap();

        let config = LicensifyConfig::from_file(&path).unwrap();
        assert_eq!(config.views.requests_page_size, 8);
        assert_eq!(
            get_config_value(&config, "views.requests_page_size").unwrap(),
            "8"
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = LicensifyConfig::default();
        assert!(set_config_value(&mut config, "api.timeout_seconds", "soon").is_err());
        assert!(set_config_value(&mut config, "llm.model", "x").is_err());
        assert!(get_config_value(&config, "views.nope").is_err());

        for days in ["99999999999", "-3"] {
            assert!(set_config_value(&mut config, "views.expiring_soon_days", days).is_err());
        }
        assert_eq!(config.views.expiring_soon_days, 7);
        set_config_value(&mut config, "views.expiring_soon_days", "30").unwrap();
        assert_eq!(config.views.expiring_soon_days, 30);
    }

    #[test]
    fn test_api_key_is_never_printed() {
        let mut config = LicensifyConfig::default();
        set_config_value(&mut config, "identity.api_key", "secret").unwrap();
        assert_eq!(config.identity.api_key.as_deref(), Some("secret"));
        assert_eq!(get_config_value(&config, "identity.api_key").unwrap(), "<set>");

        set_config_value(&mut config, "identity.api_key", "").unwrap();
        assert_eq!(config.identity.api_key, None);
    }

    #[test]
    fn test_set_requires_key_value_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let result = handle_config(
            Some(&path),
            false,
            false,
            Some("views.requests_page_size".to_string()),
            None,
            false,
            false,
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
