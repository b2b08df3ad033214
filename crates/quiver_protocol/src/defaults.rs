//! Canonical default values shared by the client, sync engine and CLI.

pub const DEFAULT_API_URL: &str = "https://api.quiver.app/v1/";
pub const DEFAULT_PAGE_LIMIT: u32 = 100;
pub const DEFAULT_VISIBLE_INCREMENT: usize = 50;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 250;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "QUIVER_API_URL";
pub const ENV_API_KEY: &str = "QUIVER_API_KEY";

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";
