//! Panel Controller
//!
//! Owns one panel's state: the sync engine, the preload coordinator, the
//! user's view inputs, the selection and preview cursor, and the search
//! debounce timer. Hosts drive it through the `on_*`, `select_*` and search
//! methods and receive frames through their [`ViewSink`].
//!
//! Every mutation that changes what is shown ends in exactly one
//! [`ViewSink::render`] call.

use quiver_client::CatalogSource;
use quiver_protocol::{Asset, AssetId, DownloadLocator, Folder, FolderId, PanelConfig};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::CatalogSnapshot;
use crate::error::{Result, SyncError};
use crate::preferences::Preferences;
use crate::preload::{PreloadCoordinator, PreloadState};
use crate::selection::{PreviewCursor, Selection};
use crate::sink::{StatusKind, StatusMessage, ViewSink, ViewUpdate};
use crate::sync::{CatalogSync, SyncOutcome};
use crate::timer::CancellableTimer;
use crate::view::{
    compute_view, folder_counts, CatalogView, FolderCounts, FolderScope, FolderSelector, ViewState,
};

pub struct PanelController<C, P, S> {
    sync: CatalogSync<C>,
    preload: PreloadCoordinator<C>,
    prefs: P,
    sink: S,
    view: ViewState,
    last_view: CatalogView,
    selection: Selection,
    preview: PreviewCursor,
    status: Option<StatusMessage>,
    search_debounce: Duration,
    search_timer: CancellableTimer,
    /// Bumped on every search input; fired queries from older inputs are dropped.
    search_generation: u64,
    search_tx: mpsc::UnboundedSender<(u64, String)>,
    search_rx: mpsc::UnboundedReceiver<(u64, String)>,
}

impl<C, P, S> PanelController<C, P, S>
where
    C: CatalogSource,
    P: Preferences,
    S: ViewSink,
{
    pub fn new(client: Arc<C>, prefs: P, sink: S, config: &PanelConfig) -> Self {
        let (search_tx, search_rx) = mpsc::unbounded_channel();
        Self {
            sync: CatalogSync::new(Arc::clone(&client), config.page_limit),
            preload: PreloadCoordinator::new(client, config.page_limit.max(1)),
            prefs,
            sink,
            view: ViewState::new(config.visible_increment),
            last_view: CatalogView::default(),
            selection: Selection::new(),
            preview: PreviewCursor::new(),
            status: None,
            search_debounce: config.search_debounce(),
            search_timer: CancellableTimer::new(),
            search_generation: 0,
            search_tx,
            search_rx,
        }
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Start downloading the catalog ahead of the first paint.
    pub fn start_preload(&mut self) {
        self.preload.start();
    }

    /// First load: takes whatever the preload produced and fetches the rest.
    /// Restores the last viewed folder once the catalog is in.
    pub async fn initial_load(&mut self) -> Result<SyncOutcome> {
        let token = self.sync.begin_cycle();
        let assets = self.preload.consume_assets().await;
        let folders = self.preload.consume_folders().await;
        debug!(
            session = %token,
            preloaded_assets = assets.is_some(),
            preloaded_folders = folders.is_some(),
            "Initial load"
        );
        let result = self.sync.run_cycle_with(token, assets, folders).await;
        self.finish_cycle(result)
    }

    /// Re-download the whole catalog. Any preload still running is dropped.
    pub async fn refresh(&mut self) -> Result<SyncOutcome> {
        self.preload.reset();
        let result = self.sync.sync().await;
        self.finish_cycle(result)
    }

    /// Switch to a different catalog source (e.g. new credentials). Drops the
    /// cached catalog, any preload, the selection and the preview.
    pub fn replace_source(&mut self, client: Arc<C>) {
        self.sync.replace_client(Arc::clone(&client));
        self.preload.replace_client(client);
        self.clear_selection();
        self.preview.close();
        self.status = None;
        info!("Catalog source replaced");
        self.render();
    }

    fn finish_cycle(&mut self, result: Result<SyncOutcome>) -> Result<SyncOutcome> {
        match result {
            Ok(SyncOutcome::Superseded) => Ok(SyncOutcome::Superseded),
            Ok(outcome) => {
                if matches!(&self.status, Some(s) if s.kind == StatusKind::Error) {
                    self.status = None;
                }
                self.reconcile_selection();
                self.render();
                Ok(outcome)
            }
            Err(err) => {
                warn!("Catalog sync failed: {}", err);
                self.status = Some(StatusMessage::error(format!("Could not load assets: {}", err)));
                self.render();
                Err(err)
            }
        }
    }

    /// Restore the stored folder on first load; afterwards fall back to `All`
    /// when the selected folder no longer exists. An empty folder list means
    /// the folder fetch failed, so the selection is kept.
    fn reconcile_selection(&mut self) {
        let snapshot = self.sync.snapshot();
        let wanted = match &self.view.selected {
            Some(selected) => selected.clone(),
            None => self.prefs.last_folder().unwrap_or(FolderSelector::All),
        };
        let resolved = match wanted {
            FolderSelector::Folder(id)
                if !snapshot.folders.is_empty() && !snapshot.folders.contains(&id) =>
            {
                info!(folder = %id, "Selected folder no longer exists, showing all assets");
                self.status = Some(StatusMessage::info(
                    "The selected folder no longer exists. Showing all assets.",
                ));
                FolderSelector::All
            }
            other => other,
        };
        if self.view.selected.as_ref() != Some(&resolved) {
            self.view.select(resolved);
        }
    }

    // ========================================================================
    // View inputs
    // ========================================================================

    pub fn select_folder(&mut self, selector: FolderSelector) {
        debug!(folder = %selector, "Select folder");
        self.prefs.set_last_folder(&selector);
        self.view.select(selector);
        self.render();
    }

    /// Debounced search: the query is applied once input pauses for the
    /// configured delay. Call [`poll_search`](Self::poll_search) or
    /// [`settle_search`](Self::settle_search) to pick it up.
    pub fn type_search(&mut self, query: &str) {
        self.discard_pending_search();
        let generation = self.search_generation;
        let tx = self.search_tx.clone();
        let query = query.to_string();
        self.search_timer.schedule(self.search_debounce, move || {
            let _ = tx.send((generation, query));
        });
    }

    /// Apply a query immediately, dropping any debounced one.
    /// Returns whether the view changed.
    pub fn set_search(&mut self, query: &str) -> bool {
        self.discard_pending_search();
        self.apply_query(query)
    }

    /// Apply a debounced query that has already fired, without waiting.
    pub fn poll_search(&mut self) -> bool {
        match self.take_fired_search() {
            Some(query) => self.apply_query(&query),
            None => false,
        }
    }

    /// Wait for a pending debounced query and apply it.
    pub async fn settle_search(&mut self) -> bool {
        let mut latest = self.take_fired_search();
        if latest.is_none() && self.search_timer.is_pending() {
            while let Some((generation, query)) = self.search_rx.recv().await {
                if generation == self.search_generation {
                    latest = Some(query);
                    break;
                }
            }
        }
        match latest {
            Some(query) => self.apply_query(&query),
            None => false,
        }
    }

    /// Cancel the timer and forget any query it already fired.
    fn discard_pending_search(&mut self) {
        self.search_timer.cancel_pending();
        self.search_generation += 1;
        while self.search_rx.try_recv().is_ok() {}
    }

    fn take_fired_search(&mut self) -> Option<String> {
        let mut latest = None;
        while let Ok((generation, query)) = self.search_rx.try_recv() {
            if generation == self.search_generation {
                latest = Some(query);
            }
        }
        latest
    }

    fn apply_query(&mut self, query: &str) -> bool {
        if !self.view.set_query(query) {
            return false;
        }
        debug!(query, "Search");
        self.render();
        true
    }

    /// Show the next increment. No-op when everything is already shown.
    pub fn load_more(&mut self) -> bool {
        if !self.last_view.has_more {
            return false;
        }
        self.view.load_more();
        self.render();
        true
    }

    /// Flip an asset's favorite flag. Returns the new state.
    pub fn toggle_favorite(&mut self, id: &AssetId) -> bool {
        let favorite = !self.prefs.is_favorite(id);
        self.prefs.set_favorite(id, favorite);
        if self.view.effective_selector() == &FolderSelector::Favorites {
            self.render();
        }
        favorite
    }

    pub fn dismiss_status(&mut self) {
        if self.status.take().is_some() {
            self.render();
        }
    }

    // ========================================================================
    // Derived reads
    // ========================================================================

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.sync.snapshot()
    }

    /// Breadcrumb from the root down to `id`.
    pub fn folder_path(&self, id: &FolderId) -> Vec<Folder> {
        self.sync.snapshot().folders.path_to(id)
    }

    /// Folders directly under `parent`; `None` lists the roots.
    pub fn folder_children(&self, parent: Option<&FolderId>) -> Vec<Folder> {
        self.sync.snapshot().folders.children_of(parent).to_vec()
    }

    pub fn folder_counts(&self) -> FolderCounts {
        folder_counts(&self.sync.snapshot().assets)
    }

    pub fn current_view(&self) -> CatalogView {
        self.compute(&self.sync.snapshot())
    }

    /// The view as last rendered.
    pub fn displayed(&self) -> &[Asset] {
        &self.last_view.displayed
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn preload_state(&self) -> PreloadState {
        self.preload.state()
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn compute(&self, snapshot: &CatalogSnapshot) -> CatalogView {
        let query = &self.view.search_query;
        let visible = self.view.visible_count;
        match self.view.effective_selector() {
            FolderSelector::All => compute_view(&snapshot.assets, FolderScope::All, query, visible),
            FolderSelector::Folder(id) => {
                compute_view(&snapshot.assets, FolderScope::Folder(id), query, visible)
            }
            FolderSelector::Favorites => {
                let favorites: HashSet<AssetId> = snapshot
                    .assets
                    .iter()
                    .filter(|a| self.prefs.is_favorite(&a.id))
                    .map(|a| a.id.clone())
                    .collect();
                compute_view(&snapshot.assets, FolderScope::Members(&favorites), query, visible)
            }
        }
    }

    fn render(&mut self) {
        let snapshot = self.sync.snapshot();
        let view = self.compute(&snapshot);
        let update = ViewUpdate {
            displayed: view.displayed.clone(),
            selected_folder: self.view.effective_selector().clone(),
            search_query: self.view.search_query.clone(),
            has_more: view.has_more,
            total_matching: view.total_matching,
            counts: folder_counts(&snapshot.assets),
            status: self.status.clone(),
        };
        self.last_view = view;
        self.sink.render(&update);
    }

    // ========================================================================
    // Item callbacks
    // ========================================================================

    /// Toggle selection of an asset. Returns whether it is now selected.
    pub fn on_select(&mut self, id: &AssetId) -> bool {
        let selected = self.selection.toggle(id);
        self.sink.selection_changed(id, selected);
        selected
    }

    pub fn on_preview(&mut self, id: &AssetId) {
        self.preview.open(id.clone());
    }

    pub fn close_preview(&mut self) {
        self.preview.close();
    }

    pub fn previewed(&self) -> Option<&AssetId> {
        self.preview.current()
    }

    /// `(index, len)` of the previewed asset among the displayed ones.
    pub fn preview_position(&self) -> Option<(usize, usize)> {
        self.preview.position(&self.last_view.displayed)
    }

    pub fn preview_next(&mut self) -> Option<Asset> {
        self.preview.next(&self.last_view.displayed).cloned()
    }

    pub fn preview_prev(&mut self) -> Option<Asset> {
        self.preview.prev(&self.last_view.displayed).cloned()
    }

    /// Ask the catalog where to download an asset from. Failures also show up
    /// as a status message.
    pub async fn on_import(&mut self, id: &AssetId) -> Result<DownloadLocator> {
        let result = self.sync.client().request_download_locator(id).await;
        match result {
            Ok(locator) => {
                info!(asset = %id, "Download locator issued");
                Ok(locator)
            }
            Err(source) => {
                let err = SyncError::Import {
                    asset_id: id.to_string(),
                    source,
                };
                warn!("{}", err);
                self.status = Some(StatusMessage::error(err.to_string()));
                self.render();
                Err(err)
            }
        }
    }

    pub fn selected_ids(&self) -> Vec<AssetId> {
        self.selection.ids()
    }

    /// Selected assets present in the catalog, in catalog order.
    pub fn selected_assets(&self) -> Vec<Asset> {
        let snapshot = self.sync.snapshot();
        self.selection
            .resolve(&snapshot.assets)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Deselect everything, notifying the sink once per deselected asset.
    pub fn clear_selection(&mut self) {
        for id in self.selection.clear() {
            self.sink.selection_changed(&id, false);
        }
    }
}
