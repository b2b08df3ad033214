//! Config layering and engine construction shared by subcommands.
//!
//! Precedence, lowest to highest: defaults, config file, `QUIVER_*`
//! environment variables, command-line flags.

use anyhow::{Context, Result};
use quiver_client::HttpCatalogClient;
use quiver_logging::quiver_home;
use quiver_protocol::defaults::{CONFIG_FILE_NAME, PREFERENCES_FILE_NAME};
use quiver_protocol::PanelConfig;
use quiver_sync::{JsonFilePreferences, PanelController};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use super::output::CliSink;

pub type CliPanel = PanelController<HttpCatalogClient, JsonFilePreferences, CliSink>;

#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl GlobalArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| quiver_home().join(CONFIG_FILE_NAME))
    }
}

pub fn preferences_path() -> PathBuf {
    quiver_home().join(PREFERENCES_FILE_NAME)
}

/// Layer file, environment (via `env`) and flags into a validated config.
pub fn resolve_config(
    args: &GlobalArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PanelConfig> {
    let path = args.config_path();
    let mut config = PanelConfig::load_or_default(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_overrides_from(env);

    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(key) = &args.api_key {
        config.api_key = Some(key.clone());
    }

    config.validate().context("Invalid configuration")?;
    debug!(api_url = %config.api_url, page_limit = config.page_limit, "Configuration resolved");
    Ok(config)
}

pub fn load_config(args: &GlobalArgs) -> Result<PanelConfig> {
    resolve_config(args, |key| std::env::var(key).ok())
}

pub fn open_client(config: &PanelConfig) -> Result<Arc<HttpCatalogClient>> {
    let client = HttpCatalogClient::from_config(config).context("Failed to create catalog client")?;
    if !client.has_api_key() {
        warn!("No API key configured, catalog requests are unauthenticated");
    }
    Ok(Arc::new(client))
}

/// A panel backed by the HTTP catalog and the on-disk preferences.
pub fn open_panel(args: &GlobalArgs) -> Result<CliPanel> {
    let config = load_config(args)?;
    let client = open_client(&config)?;
    let prefs = JsonFilePreferences::open(preferences_path());
    Ok(PanelController::new(client, prefs, CliSink::new(), &config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_file(dir: &tempfile::TempDir, contents: &str) -> GlobalArgs {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        GlobalArgs {
            config: Some(path),
            ..GlobalArgs::default()
        }
    }

    #[test]
    fn test_flags_override_env_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_with_file(
            &dir,
            "api_url = \"https://file.example.com\"\npage_limit = 20\n",
        );

        let env = |key: &str| match key {
            "QUIVER_API_URL" => Some("https://env.example.com".to_string()),
            "QUIVER_API_KEY" => Some("env-key".to_string()),
            _ => None,
        };
        let config = resolve_config(&args, env).unwrap();
        assert_eq!(config.api_url, "https://env.example.com");
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.page_limit, 20);

        args.api_url = Some("https://flag.example.com".to_string());
        let config = resolve_config(&args, env).unwrap();
        assert_eq!(config.api_url, "https://flag.example.com");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let args = GlobalArgs {
            config: Some(dir.path().join("absent.toml")),
            ..GlobalArgs::default()
        };
        let config = resolve_config(&args, |_| None).unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_with_file(&dir, "page_limit = 0\n");
        assert!(resolve_config(&args, |_| None).is_err());
    }
}
