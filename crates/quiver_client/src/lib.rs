//! Remote catalog client
//!
//! [`CatalogSource`] is the narrow contract the sync engine needs from the
//! catalog API. [`HttpCatalogClient`] implements it over HTTPS with raw JSON
//! requests.

mod http;

pub use http::HttpCatalogClient;

use quiver_protocol::{AssetId, AssetPage, DownloadLocator, Folder, ProtocolError};
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(#[from] ProtocolError),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Raised by non-HTTP sources (mocks, offline fixtures).
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl ClientError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// What the sync engine needs from the remote catalog.
///
/// Implementations must tolerate concurrent `fetch_assets_page` calls for
/// different pages of the same sync cycle.
pub trait CatalogSource: Send + Sync + 'static {
    /// Fetch one 1-based page of the asset listing.
    fn fetch_assets_page(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<AssetPage, ClientError>> + Send;

    /// Fetch the flat folder list. Failures are absorbed and logged by the
    /// implementation; callers only ever see an empty list.
    fn fetch_folders(&self) -> impl Future<Output = Vec<Folder>> + Send;

    /// Resolve where an asset can be downloaded from for import.
    fn request_download_locator(
        &self,
        asset_id: &AssetId,
    ) -> impl Future<Output = Result<DownloadLocator, ClientError>> + Send;
}
