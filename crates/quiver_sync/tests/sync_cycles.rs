//! Sync cycle scenarios: overlapping cycles, out-of-order pages, empty
//! catalogs and failures.

use quiver_protocol::{Asset, AssetPage};
use quiver_sync::{CatalogSync, SyncError, SyncOutcome};
use quiver_test_utils::{folder, numbered_assets, GatedCatalog, MockCatalog};
use std::sync::Arc;
use std::time::Duration;

fn page(assets: Vec<Asset>, total: u64) -> AssetPage {
    AssetPage { assets, total }
}

fn ids(assets: &[Asset]) -> Vec<String> {
    assets.iter().map(|a| a.id.to_string()).collect()
}

/// C starts, D starts, D resolves, then C resolves: the cache holds D.
#[tokio::test]
async fn test_newer_cycle_wins_when_older_resolves_last() {
    let catalog = Arc::new(GatedCatalog::new().with_folders(vec![folder("A", None)]));
    let gate_c = catalog.push_gate();
    let gate_d = catalog.push_gate();
    let sync = CatalogSync::new(Arc::clone(&catalog), 100);

    let cycle_c = sync.clone();
    let token_c = cycle_c.begin_cycle();
    let task_c = tokio::spawn(async move { cycle_c.run_cycle(token_c).await });
    catalog.wait_for_calls(1).await;

    let cycle_d = sync.clone();
    let token_d = cycle_d.begin_cycle();
    let task_d = tokio::spawn(async move { cycle_d.run_cycle(token_d).await });
    catalog.wait_for_calls(2).await;

    gate_d.send(Ok(page(numbered_assets("d", 2), 2))).unwrap();
    let outcome_d = task_d.await.unwrap().unwrap();
    assert_eq!(outcome_d, SyncOutcome::Committed { assets: 2, folders: 1 });

    gate_c.send(Ok(page(numbered_assets("c", 3), 3))).unwrap();
    let outcome_c = task_c.await.unwrap().unwrap();
    assert_eq!(outcome_c, SyncOutcome::Superseded);

    let snapshot = sync.snapshot();
    assert_eq!(ids(&snapshot.assets), vec!["d-000", "d-001"]);
    assert_eq!(snapshot.token, Some(token_d));
}

/// C is past page 1 and waiting on page 2 when D starts and commits.
#[tokio::test]
async fn test_superseded_cycle_discards_later_pages() {
    let catalog = Arc::new(GatedCatalog::new());
    let gate_c1 = catalog.push_gate();
    let gate_c2 = catalog.push_gate();
    let gate_d = catalog.push_gate();
    let sync = CatalogSync::new(Arc::clone(&catalog), 2);

    let cycle_c = sync.clone();
    let token_c = cycle_c.begin_cycle();
    let task_c = tokio::spawn(async move { cycle_c.run_cycle(token_c).await });
    gate_c1.send(Ok(page(numbered_assets("c", 2), 3))).unwrap();
    catalog.wait_for_calls(2).await;

    let token_d = sync.begin_cycle();
    let sync_d = sync.clone();
    let task_d = tokio::spawn(async move { sync_d.run_cycle(token_d).await });
    catalog.wait_for_calls(3).await;
    gate_d.send(Ok(page(numbered_assets("d", 1), 1))).unwrap();
    assert!(task_d.await.unwrap().unwrap().is_committed());

    gate_c2.send(Ok(page(numbered_assets("c2", 1), 3))).unwrap();
    assert_eq!(task_c.await.unwrap().unwrap(), SyncOutcome::Superseded);
    assert_eq!(ids(&sync.snapshot().assets), vec!["d-000"]);
}

/// A superseded cycle that fails reports nothing and leaves the cache alone.
#[tokio::test]
async fn test_superseded_failure_is_silent() {
    let catalog = Arc::new(GatedCatalog::new());
    let gate_c = catalog.push_gate();
    let gate_d = catalog.push_gate();
    let sync = CatalogSync::new(Arc::clone(&catalog), 100);

    let cycle_c = sync.clone();
    let token_c = cycle_c.begin_cycle();
    let task_c = tokio::spawn(async move { cycle_c.run_cycle(token_c).await });
    catalog.wait_for_calls(1).await;

    let cycle_d = sync.clone();
    let token_d = cycle_d.begin_cycle();
    let task_d = tokio::spawn(async move { cycle_d.run_cycle(token_d).await });
    catalog.wait_for_calls(2).await;
    gate_d.send(Ok(page(numbered_assets("d", 1), 1))).unwrap();
    task_d.await.unwrap().unwrap();

    drop(gate_c);
    assert_eq!(task_c.await.unwrap().unwrap(), SyncOutcome::Superseded);
    assert_eq!(ids(&sync.snapshot().assets), vec!["d-000"]);
}

/// 250 assets at 100 per page, pages answering 3, 2, 1: assembled in page order.
#[tokio::test(start_paused = true)]
async fn test_pages_assemble_in_page_order() {
    let assets = numbered_assets("a", 250);
    let catalog = Arc::new(
        MockCatalog::new(assets.clone(), Vec::new())
            .with_page_delay(2, Duration::from_millis(300))
            .with_page_delay(3, Duration::from_millis(10)),
    );
    let sync = CatalogSync::new(Arc::clone(&catalog), 100);

    let outcome = sync.sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Committed { assets: 250, folders: 0 });
    assert_eq!(ids(&sync.snapshot().assets), ids(&assets));

    let mut calls = catalog.page_calls();
    calls.sort_unstable();
    assert_eq!(calls, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_empty_catalog_fetches_one_page() {
    let catalog = Arc::new(MockCatalog::new(Vec::new(), Vec::new()));
    let sync = CatalogSync::new(Arc::clone(&catalog), 100);

    let outcome = sync.sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Committed { assets: 0, folders: 0 });
    assert_eq!(catalog.page_calls(), vec![1]);
    assert!(sync.snapshot().is_empty());
    assert!(sync.snapshot().synced_at.is_some());
}

#[tokio::test]
async fn test_first_page_failure_is_typed() {
    let catalog =
        Arc::new(MockCatalog::new(numbered_assets("a", 5), Vec::new()).with_failing_page(1));
    let sync = CatalogSync::new(catalog, 100);

    let err = sync.sync().await.unwrap_err();
    assert_eq!(err.failed_page(), Some(1));
    assert!(matches!(err, SyncError::PageFailed { page: 1, .. }));
    assert!(sync.snapshot().synced_at.is_none());
}

#[tokio::test]
async fn test_absurd_total_fails_without_committing() {
    let catalog = Arc::new(
        MockCatalog::new(numbered_assets("a", 5), Vec::new()).with_reported_total(1 << 40),
    );
    let sync = CatalogSync::new(Arc::clone(&catalog), 100);

    let err = sync.sync().await.unwrap_err();
    assert!(matches!(err, SyncError::TooManyPages { .. }));
    assert_eq!(err.failed_page(), None);
    assert_eq!(catalog.page_calls(), vec![1]);
    assert!(sync.snapshot().synced_at.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_later_page_failure_aborts_cycle() {
    let catalog = Arc::new(
        MockCatalog::new(numbered_assets("a", 250), Vec::new())
            .with_failing_page(3)
            .with_page_delay(2, Duration::from_secs(5)),
    );
    let sync = CatalogSync::new(catalog, 100);

    let err = sync.sync().await.unwrap_err();
    assert_eq!(err.failed_page(), Some(3));
    assert!(sync.snapshot().is_empty());
}
