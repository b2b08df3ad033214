//! Quiver Test Utilities
//!
//! In-memory [`CatalogSource`] implementations for exercising the sync engine
//! without a network:
//!
//! - [`MockCatalog`]: serves a fixed catalog page by page, with optional
//!   per-page delays (to force out-of-order arrival) and failing pages.
//! - [`GatedCatalog`]: every page request blocks until the test releases it,
//!   so tests decide exactly when each in-flight fetch resolves.
//!
//! Plus fixture builders for assets and folders.

pub mod fixtures;

pub use fixtures::{asset, folder, named_asset, numbered_assets};

use quiver_client::{CatalogSource, ClientError};
use quiver_protocol::{Asset, AssetId, AssetPage, DownloadLocator, Folder};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Default)]
struct MockState {
    assets: Vec<Asset>,
    folders: Vec<Folder>,
    reported_total: Option<u64>,
    failing_pages: HashSet<u32>,
    page_delays: HashMap<u32, Duration>,
    folder_delay: Option<Duration>,
    page_calls: Vec<u32>,
    folder_calls: usize,
}

/// Catalog that slices a fixed asset list into pages.
#[derive(Default)]
pub struct MockCatalog {
    state: Mutex<MockState>,
}

impl MockCatalog {
    pub fn new(assets: Vec<Asset>, folders: Vec<Folder>) -> Self {
        Self {
            state: Mutex::new(MockState {
                assets,
                folders,
                ..MockState::default()
            }),
        }
    }

    /// Report a `total` different from the asset count.
    pub fn with_reported_total(self, total: u64) -> Self {
        self.lock().reported_total = Some(total);
        self
    }

    pub fn with_failing_page(self, page: u32) -> Self {
        self.lock().failing_pages.insert(page);
        self
    }

    pub fn with_page_delay(self, page: u32, delay: Duration) -> Self {
        self.lock().page_delays.insert(page, delay);
        self
    }

    pub fn with_folder_delay(self, delay: Duration) -> Self {
        self.lock().folder_delay = Some(delay);
        self
    }

    /// Swap the served catalog, e.g. to simulate remote changes between syncs.
    pub fn set_catalog(&self, assets: Vec<Asset>, folders: Vec<Folder>) {
        let mut state = self.lock();
        state.assets = assets;
        state.folders = folders;
    }

    pub fn set_failing_page(&self, page: u32, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing_pages.insert(page);
        } else {
            state.failing_pages.remove(&page);
        }
    }

    /// Pages requested so far, in request order.
    pub fn page_calls(&self) -> Vec<u32> {
        self.lock().page_calls.clone()
    }

    pub fn folder_calls(&self) -> usize {
        self.lock().folder_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn plan_page(
        &self,
        page: u32,
        limit: u32,
    ) -> (Option<Duration>, Result<AssetPage, ClientError>) {
        let mut state = self.lock();
        state.page_calls.push(page);
        let delay = state.page_delays.get(&page).copied();

        if state.failing_pages.contains(&page) {
            return (delay, Err(ClientError::unavailable(format!("page {} failed", page))));
        }

        let limit = limit.max(1) as usize;
        let start = (page.saturating_sub(1) as usize).saturating_mul(limit);
        let assets: Vec<Asset> = state.assets.iter().skip(start).take(limit).cloned().collect();
        let total = state.reported_total.unwrap_or(state.assets.len() as u64);
        (delay, Ok(AssetPage { assets, total }))
    }
}

impl CatalogSource for MockCatalog {
    async fn fetch_assets_page(&self, page: u32, limit: u32) -> Result<AssetPage, ClientError> {
        let (delay, result) = self.plan_page(page, limit);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn fetch_folders(&self) -> Vec<Folder> {
        let (delay, folders) = {
            let mut state = self.lock();
            state.folder_calls += 1;
            (state.folder_delay, state.folders.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        folders
    }

    async fn request_download_locator(
        &self,
        asset_id: &AssetId,
    ) -> Result<DownloadLocator, ClientError> {
        let known = self.lock().assets.iter().any(|a| &a.id == asset_id);
        if !known {
            return Err(ClientError::Status {
                status: 404,
                body: format!("unknown asset {}", asset_id),
            });
        }
        Ok(DownloadLocator {
            url: format!("https://cdn.test/{}", asset_id),
        })
    }
}

type PageGate = oneshot::Receiver<Result<AssetPage, ClientError>>;

/// Catalog whose page requests resolve only when the test sends a result.
///
/// Requests consume gates in the order they were pushed; a request with no
/// gate left, or whose sender is dropped, fails.
#[derive(Default)]
pub struct GatedCatalog {
    gates: Mutex<VecDeque<PageGate>>,
    folders: Mutex<Vec<Folder>>,
    page_calls: AtomicUsize,
}

impl GatedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folders(self, folders: Vec<Folder>) -> Self {
        *self.folders.lock().unwrap_or_else(PoisonError::into_inner) = folders;
        self
    }

    /// Queue a gate for the next page request and return its release handle.
    pub fn push_gate(&self) -> oneshot::Sender<Result<AssetPage, ClientError>> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(rx);
        tx
    }

    /// Number of page requests that have started (and taken a gate).
    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    /// Yield until at least `n` page requests have started.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.page_calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

impl CatalogSource for GatedCatalog {
    async fn fetch_assets_page(&self, page: u32, _limit: u32) -> Result<AssetPage, ClientError> {
        let gate = self
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::unavailable("gate dropped"))),
            None => Err(ClientError::unavailable(format!("no gate for page {}", page))),
        }
    }

    async fn fetch_folders(&self) -> Vec<Folder> {
        self.folders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn request_download_locator(
        &self,
        asset_id: &AssetId,
    ) -> Result<DownloadLocator, ClientError> {
        Ok(DownloadLocator {
            url: format!("https://cdn.test/{}", asset_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_catalog_pages() {
        let catalog = MockCatalog::new(numbered_assets("a", 5), Vec::new());
        let page = catalog.fetch_assets_page(2, 2).await.unwrap();
        assert_eq!(page.total, 5);
        let ids: Vec<&str> = page.assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a-002", "a-003"]);
        assert_eq!(catalog.page_calls(), vec![2]);
    }

    #[tokio::test]
    async fn test_gated_catalog_releases_in_order() {
        let catalog = GatedCatalog::new();
        let release = catalog.push_gate();
        release
            .send(Ok(AssetPage {
                assets: numbered_assets("g", 1),
                total: 1,
            }))
            .unwrap();
        let page = catalog.fetch_assets_page(1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(catalog.fetch_assets_page(1, 10).await.is_err());
    }
}
