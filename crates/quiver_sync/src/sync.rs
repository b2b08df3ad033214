//! Catalog sync cycles
//!
//! A cycle begins a session, downloads every asset page plus the folder list
//! (concurrently), and commits both to the cache only if its session is still
//! current. A cycle overtaken by a newer one finishes as
//! [`SyncOutcome::Superseded`] without touching the cache, even if it failed.
//! A failing current cycle leaves the previous catalog in place.

use quiver_client::CatalogSource;
use quiver_protocol::{Asset, Folder};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{CatalogCache, CatalogSnapshot};
use crate::error::Result;
use crate::fetch::fetch_all_assets;
use crate::session::{SessionManager, SessionToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Committed { assets: usize, folders: usize },
    /// A newer session began before this cycle could commit.
    Superseded,
}

impl SyncOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, SyncOutcome::Committed { .. })
    }
}

/// Sync engine. Clones share the session counter and the cache, so cycles
/// started from different clones still supersede each other.
pub struct CatalogSync<C> {
    client: Arc<C>,
    sessions: SessionManager,
    cache: CatalogCache,
    page_limit: u32,
}

impl<C> Clone for CatalogSync<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            sessions: self.sessions.clone(),
            cache: self.cache.clone(),
            page_limit: self.page_limit,
        }
    }
}

impl<C: CatalogSource> CatalogSync<C> {
    pub fn new(client: Arc<C>, page_limit: u32) -> Self {
        Self {
            client,
            sessions: SessionManager::new(),
            cache: CatalogCache::new(),
            page_limit: page_limit.max(1),
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.cache.snapshot()
    }

    /// Begin a new cycle, invalidating every cycle still in flight.
    pub fn begin_cycle(&self) -> SessionToken {
        let token = self.sessions.begin();
        debug!(session = %token, "Begin sync cycle");
        token
    }

    /// Begin and run a full cycle.
    pub async fn sync(&self) -> Result<SyncOutcome> {
        let token = self.begin_cycle();
        self.run_cycle(token).await
    }

    pub async fn run_cycle(&self, token: SessionToken) -> Result<SyncOutcome> {
        self.run_cycle_with(token, None, None).await
    }

    /// Run a cycle, reusing already-downloaded assets and/or folders (from a
    /// preload) and fetching only what is missing.
    pub async fn run_cycle_with(
        &self,
        token: SessionToken,
        preloaded_assets: Option<Vec<Asset>>,
        preloaded_folders: Option<Vec<Folder>>,
    ) -> Result<SyncOutcome> {
        let sessions = &self.sessions;
        let assets = async {
            match preloaded_assets {
                Some(assets) => Ok(Some(assets)),
                None => {
                    fetch_all_assets(&self.client, self.page_limit, || {
                        sessions.is_current(token)
                    })
                    .await
                }
            }
        };
        let folders = async {
            match preloaded_folders {
                Some(folders) => folders,
                None => self.client.fetch_folders().await,
            }
        };
        let (assets, folders) = tokio::join!(assets, folders);

        let assets = match assets {
            Ok(Some(assets)) => assets,
            Ok(None) => {
                debug!(session = %token, "Sync superseded after first page");
                return Ok(SyncOutcome::Superseded);
            }
            Err(err) if !self.sessions.is_current(token) => {
                debug!(session = %token, "Superseded sync failed, ignoring: {}", err);
                return Ok(SyncOutcome::Superseded);
            }
            Err(err) => return Err(err),
        };

        let counts = (assets.len(), folders.len());
        if self
            .cache
            .commit_if_current(&self.sessions, token, assets, &folders)
        {
            info!(
                session = %token,
                assets = counts.0,
                folders = counts.1,
                "Catalog synced"
            );
            Ok(SyncOutcome::Committed {
                assets: counts.0,
                folders: counts.1,
            })
        } else {
            debug!(session = %token, "Discarding superseded sync result");
            Ok(SyncOutcome::Superseded)
        }
    }

    /// Drop the cached catalog and invalidate every in-flight cycle.
    pub fn invalidate(&self) -> SessionToken {
        let token = self.sessions.begin();
        self.cache.clear();
        info!(session = %token, "Catalog cache invalidated");
        token
    }

    /// Use a different catalog source (e.g. after an API key change). Also
    /// invalidates the cache; results of the old source can no longer commit.
    pub fn replace_client(&mut self, client: Arc<C>) {
        self.client = client;
        self.invalidate();
    }
}
