//! Paged catalog download.
//!
//! Page 1 is fetched first to learn `total`; pages 2..N then run in parallel
//! on a `JoinSet`. Pages are written into per-page slots and concatenated in
//! ascending page order, whatever order the network answers in, so the
//! visible slice never reshuffles between renders.
//!
//! `total` comes from the server, so the page count it implies is capped at
//! [`MAX_SYNC_PAGES`] before anything is spawned.

use quiver_client::CatalogSource;
use quiver_protocol::Asset;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::{Result, SyncError};

/// Upper bound on pages in one sync cycle (10M assets at the default limit).
pub const MAX_SYNC_PAGES: u32 = 100_000;

/// Number of pages needed for `total` assets at `limit` per page.
pub fn page_count(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    let pages = total.div_ceil(limit);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Download every asset page.
///
/// `still_wanted` is consulted once page 1 has arrived; when it returns
/// false the remaining pages are never requested and `Ok(None)` is returned.
/// The first failing page aborts the download; sibling page tasks are
/// aborted and their results dropped.
pub async fn fetch_all_assets<C, F>(
    client: &Arc<C>,
    limit: u32,
    still_wanted: F,
) -> Result<Option<Vec<Asset>>>
where
    C: CatalogSource,
    F: Fn() -> bool,
{
    let limit = limit.max(1);
    let first = client
        .fetch_assets_page(1, limit)
        .await
        .map_err(|source| SyncError::PageFailed { page: 1, source })?;

    if !still_wanted() {
        return Ok(None);
    }

    let pages = page_count(first.total, limit);
    if pages > MAX_SYNC_PAGES {
        warn!(total = first.total, limit, "Catalog reports more pages than allowed");
        return Err(SyncError::TooManyPages {
            total: first.total,
            limit,
        });
    }

    let mut later_pages: BTreeMap<u32, Vec<Asset>> = BTreeMap::new();

    let mut tasks = JoinSet::new();
    for page in 2..=pages {
        let client = Arc::clone(client);
        tasks.spawn(async move {
            let result = client.fetch_assets_page(page, limit).await;
            (page, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (page, result) = joined.map_err(|e| SyncError::TaskFailed(e.to_string()))?;
        match result {
            Ok(body) => {
                later_pages.insert(page, body.assets);
            }
            Err(source) => {
                tasks.abort_all();
                return Err(SyncError::PageFailed { page, source });
            }
        }
    }

    let mut assets = first.assets;
    for page in later_pages.into_values() {
        assets.extend(page);
    }
    Ok(Some(assets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_test_utils::{numbered_assets, MockCatalog};
    use std::time::Duration;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 100), 0);
        assert_eq!(page_count(1, 100), 1);
        assert_eq!(page_count(100, 100), 1);
        assert_eq!(page_count(250, 100), 3);
        assert_eq!(page_count(5, 0), 5);
        assert_eq!(page_count(u64::MAX, 100), u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_assembled_in_page_order() {
        let catalog = Arc::new(
            MockCatalog::new(numbered_assets("a", 250), Vec::new())
                .with_page_delay(2, Duration::from_millis(300))
                .with_page_delay(3, Duration::from_millis(10)),
        );

        let assets = fetch_all_assets(&catalog, 100, || true)
            .await
            .unwrap()
            .unwrap();

        let expected = numbered_assets("a", 250);
        assert_eq!(assets.len(), 250);
        assert_eq!(&assets[..100], &expected[..100]);
        assert_eq!(&assets[100..200], &expected[100..200]);
        assert_eq!(&assets[200..], &expected[200..]);
    }

    #[tokio::test]
    async fn test_empty_catalog_fetches_only_page_one() {
        let catalog = Arc::new(MockCatalog::new(Vec::new(), Vec::new()));
        let assets = fetch_all_assets(&catalog, 100, || true)
            .await
            .unwrap()
            .unwrap();
        assert!(assets.is_empty());
        assert_eq!(catalog.page_calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_later_page_failure_aborts() {
        let catalog = Arc::new(
            MockCatalog::new(numbered_assets("a", 250), Vec::new()).with_failing_page(3),
        );
        let err = fetch_all_assets(&catalog, 100, || true).await.unwrap_err();
        assert_eq!(err.failed_page(), Some(3));
    }

    #[tokio::test]
    async fn test_oversized_total_is_rejected_before_fanning_out() {
        let catalog = Arc::new(
            MockCatalog::new(numbered_assets("a", 3), Vec::new()).with_reported_total(u64::MAX),
        );
        let err = fetch_all_assets(&catalog, 100, || true).await.unwrap_err();
        assert!(matches!(err, SyncError::TooManyPages { limit: 100, .. }));
        assert_eq!(catalog.page_calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_overstated_total_yields_empty_trailing_pages() {
        let catalog = Arc::new(
            MockCatalog::new(numbered_assets("a", 150), Vec::new()).with_reported_total(400),
        );
        let assets = fetch_all_assets(&catalog, 100, || true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assets, numbered_assets("a", 150));
        let mut calls = catalog.page_calls();
        calls.sort_unstable();
        assert_eq!(calls, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_unwanted_after_first_page_stops() {
        let catalog = Arc::new(MockCatalog::new(numbered_assets("a", 250), Vec::new()));
        let result = fetch_all_assets(&catalog, 100, || false).await.unwrap();
        assert!(result.is_none());
        assert_eq!(catalog.page_calls(), vec![1]);
    }
}
