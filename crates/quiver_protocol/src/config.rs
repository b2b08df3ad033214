//! Panel configuration.
//!
//! Read from `<quiver home>/config.toml`, then overridden by `QUIVER_*`
//! environment variables, then by CLI flags in the binary.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::defaults::{
    DEFAULT_API_URL, DEFAULT_PAGE_LIMIT, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SEARCH_DEBOUNCE_MS, DEFAULT_VISIBLE_INCREMENT, ENV_API_KEY, ENV_API_URL,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Catalog API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Assets requested per page
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Items added to the visible slice by each "Load More"
    #[serde(default = "default_visible_increment")]
    pub visible_increment: usize,

    /// Quiet period before a typed search is applied
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_visible_increment() -> usize {
    DEFAULT_VISIBLE_INCREMENT
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            page_limit: default_page_limit(),
            visible_increment: default_visible_increment(),
            search_debounce_ms: default_search_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl PanelConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, treating a missing file as all defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// Parsed API base URL. Always ends with `/` so relative endpoints join
    /// beneath it instead of replacing its last segment.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                reason: "not a base URL".to_string(),
            });
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.page_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "page_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.visible_increment == 0 {
            return Err(ConfigError::Invalid {
                field: "visible_increment",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = PanelConfig::default();
        assert_eq!(config.page_limit, 100);
        assert_eq!(config.visible_increment, 50);
        assert!(config.api_key.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PanelConfig = toml::from_str(
            r#"
            api_url = "https://catalog.example.com/api"
            page_limit = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.page_limit, 25);
        assert_eq!(config.search_debounce_ms, 250);
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://catalog.example.com/api/"
        );
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut config = PanelConfig::default();
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://localhost:8080/"),
            (ENV_API_KEY, "secret"),
        ]
        .into_iter()
        .collect();
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api_url, "http://localhost:8080/");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = PanelConfig::default();
        config.apply_overrides_from(|_| Some("  ".to_string()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PanelConfig {
            api_url: "not a url".to_string(),
            ..PanelConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { .. })));

        let config = PanelConfig {
            page_limit: 0,
            ..PanelConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "page_limit", .. })
        ));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = PanelConfig::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = PanelConfig {
            api_key: Some("k".to_string()),
            page_limit: 10,
            ..PanelConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(PanelConfig::load(&path).unwrap(), config);
    }
}
