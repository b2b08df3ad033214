//! Tolerant decoding of catalog responses.
//!
//! The catalog normally wraps listings (`{"assets": [...], "total": n}` and
//! `{"folders": [...]}`), but degenerate responses arrive as bare arrays.
//! Both shapes decode to the same types.

use serde::Deserialize;

use crate::error::Result;
use crate::types::{Asset, AssetPage, DownloadLocator, Folder};

#[derive(Deserialize)]
#[serde(untagged)]
enum AssetsEnvelope {
    Wrapped {
        assets: Vec<Asset>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<Asset>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FoldersEnvelope {
    Wrapped { folders: Vec<Folder> },
    Bare(Vec<Folder>),
}

/// Decode one page of the asset listing.
///
/// A bare array, or a wrapper without `total`, reports the page length as the
/// total, which makes it a single-page catalog.
pub fn parse_asset_page(body: &[u8]) -> Result<AssetPage> {
    let page = match serde_json::from_slice::<AssetsEnvelope>(body)? {
        AssetsEnvelope::Wrapped { assets, total } => {
            let total = total.unwrap_or(assets.len() as u64);
            AssetPage { assets, total }
        }
        AssetsEnvelope::Bare(assets) => AssetPage {
            total: assets.len() as u64,
            assets,
        },
    };
    Ok(page)
}

/// Decode the flat folder listing.
pub fn parse_folders(body: &[u8]) -> Result<Vec<Folder>> {
    let folders = match serde_json::from_slice::<FoldersEnvelope>(body)? {
        FoldersEnvelope::Wrapped { folders } => folders,
        FoldersEnvelope::Bare(folders) => folders,
    };
    Ok(folders)
}

/// Decode a download locator response.
pub fn parse_download_locator(body: &[u8]) -> Result<DownloadLocator> {
    Ok(serde_json::from_slice(body)?)
}
