//! Console configuration

use config::{Config, ConfigError, Environment};
use infra_http::HttpConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PREFIX: &str = "HOADON";

/// Console configuration, read from `HOADON_*` environment variables
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    /// Backend root URL
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Deadline for bulk batch saves
    pub bulk_timeout_secs: u64,
    /// Batches per dashboard page
    pub page_size: u32,
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Where the theme preference is kept
    pub preferences_path: PathBuf,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8002".to_string(),
            request_timeout_secs: 30,
            bulk_timeout_secs: 60,
            page_size: 10,
            log_level: "info".to_string(),
            log_json: false,
            preferences_path: PathBuf::from("hoadon-preferences.json"),
            username: None,
            password: None,
        }
    }
}

impl DashboardConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from an environment source over the defaults
    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config: Self = Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("bulk_timeout_secs", defaults.bulk_timeout_secs as i64)?
            .set_default("page_size", defaults.page_size as i64)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_json", defaults.log_json)?
            .set_default("preferences_path", defaults.preferences_path.to_string_lossy().to_string())?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Message("page_size must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 || self.bulk_timeout_secs == 0 {
            return Err(ConfigError::Message("timeouts must be at least one second".to_string()));
        }
        Ok(())
    }

    pub fn bulk_timeout(&self) -> Duration {
        Duration::from_secs(self.bulk_timeout_secs)
    }

    /// Client settings for the backend
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(self.api_base_url.clone())
            .request_timeout(Duration::from_secs(self.request_timeout_secs))
            .bulk_timeout(self.bulk_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let source: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        DashboardConfig::from_environment(Environment::with_prefix(ENV_PREFIX).source(Some(source)))
    }

    #[test]
    fn test_defaults_apply() {
        let config = load(&[]).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.http_config().bulk_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_environment_overrides() {
        let config = load(&[
            ("HOADON_API_BASE_URL", "https://api.example.vn"),
            ("HOADON_BULK_TIMEOUT_SECS", "120"),
            ("HOADON_LOG_JSON", "true"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.example.vn");
        assert_eq!(config.bulk_timeout_secs, 120);
        assert!(config.log_json);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(load(&[("HOADON_PAGE_SIZE", "0")]).is_err());
    }
}
