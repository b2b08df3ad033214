//! HTTP implementation of the catalog contract.
//!
//! Uses raw JSON requests (no SDK): `GET assets`, `GET folders` and
//! `GET assets/<id>/download` relative to the configured base URL.

use quiver_protocol::{
    parse_asset_page, parse_download_locator, parse_folders, AssetId, AssetPage,
    DownloadLocator, Folder, PanelConfig,
};
use std::time::Duration;
use url::Url;

use crate::{CatalogSource, ClientError};

/// Longest error body kept in `ClientError::Status`
const MAX_ERROR_BODY: usize = 500;

pub struct HttpCatalogClient {
    base_url: Url,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new(
        base_url: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
            http_client,
        })
    }

    pub fn from_config(config: &PanelConfig) -> Result<Self, ClientError> {
        let base_url = config
            .base_url()
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Self::new(base_url, config.api_key.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Folder listing with failures surfaced, for callers that want to report them.
    pub async fn try_fetch_folders(&self) -> Result<Vec<Folder>, ClientError> {
        let url = self.endpoint(&["folders"])?;
        let body = self.get(url).await?;
        Ok(parse_folders(&body)?)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn assets_page_url(&self, page: u32, limit: u32) -> Result<Url, ClientError> {
        let mut url = self.endpoint(&["assets"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, ClientError> {
        tracing::debug!("GET {}", url);

        let mut request = self.http_client.get(url);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl CatalogSource for HttpCatalogClient {
    async fn fetch_assets_page(&self, page: u32, limit: u32) -> Result<AssetPage, ClientError> {
        let url = self.assets_page_url(page, limit)?;
        let body = self.get(url).await?;
        Ok(parse_asset_page(&body)?)
    }

    async fn fetch_folders(&self) -> Vec<Folder> {
        match self.try_fetch_folders().await {
            Ok(folders) => folders,
            Err(err) => {
                tracing::warn!("Folder fetch failed, continuing without folders: {}", err);
                Vec::new()
            }
        }
    }

    async fn request_download_locator(
        &self,
        asset_id: &AssetId,
    ) -> Result<DownloadLocator, ClientError> {
        let url = self.endpoint(&["assets", asset_id.as_str(), "download"])?;
        let body = self.get(url).await?;
        Ok(parse_download_locator(&body)?)
    }
}

fn truncate(body: String) -> String {
    if body.chars().count() <= MAX_ERROR_BODY {
        return body;
    }
    let cut: String = body.chars().take(MAX_ERROR_BODY).collect();
    format!("{}... (truncated)", cut)
}
