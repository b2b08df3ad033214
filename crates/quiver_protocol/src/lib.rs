//! Quiver catalog protocol
//!
//! Shared vocabulary between the catalog client, the sync engine and the CLI:
//!
//! - **ids**: `AssetId` / `FolderId` wrappers
//! - **types**: `Asset`, `Folder`, `AssetPage`, `DownloadLocator`
//! - **wire**: tolerant response decoding (wrapped or bare-array listings)
//! - **config**: `PanelConfig` loaded from TOML + environment

pub mod config;
pub mod defaults;
pub mod error;
pub mod ids;
pub mod types;
pub mod wire;

pub use config::{ConfigError, PanelConfig};
pub use error::ProtocolError;
pub use ids::{AssetId, FolderId};
pub use types::{Asset, AssetPage, DownloadLocator, Folder};
pub use wire::{parse_asset_page, parse_download_locator, parse_folders};
