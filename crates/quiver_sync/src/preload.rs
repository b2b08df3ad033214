//! Preload Coordinator
//!
//! Starts the catalog and folder downloads before the user navigates, then
//! hands the in-flight results to the first real sync so the first paint does
//! not fetch everything twice.
//!
//! Each track (assets, folders) moves `Idle -> InFlight -> Ready`, where
//! `Ready` is a finished task whose result has not been taken yet.
//! `consume` takes the result and returns the track to `Idle`; `None` means
//! "preload unavailable" and the caller fetches directly. Preload failures are
//! logged and become `None`; they never propagate.

use quiver_client::CatalogSource;
use quiver_protocol::{Asset, Folder};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::fetch::fetch_all_assets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadPhase {
    Idle,
    InFlight,
    Ready,
}

#[derive(Debug)]
enum Track<T> {
    Idle,
    Running(JoinHandle<Option<T>>),
}

impl<T> Default for Track<T> {
    fn default() -> Self {
        Track::Idle
    }
}

impl<T: Send + 'static> Track<T> {
    fn phase(&self) -> PreloadPhase {
        match self {
            Track::Idle => PreloadPhase::Idle,
            Track::Running(handle) if handle.is_finished() => PreloadPhase::Ready,
            Track::Running(_) => PreloadPhase::InFlight,
        }
    }

    async fn consume(&mut self, name: &str) -> Option<T> {
        match std::mem::take(self) {
            Track::Idle => None,
            Track::Running(handle) => match handle.await {
                Ok(value) => value,
                Err(err) => {
                    warn!("Preload {} task ended abnormally: {}", name, err);
                    None
                }
            },
        }
    }

    fn abort(&mut self) {
        if let Track::Running(handle) = std::mem::take(self) {
            handle.abort();
        }
    }
}

/// Phase of both preload tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadState {
    pub assets: PreloadPhase,
    pub folders: PreloadPhase,
}

pub struct PreloadCoordinator<C> {
    client: Arc<C>,
    page_limit: u32,
    assets: Track<Vec<Asset>>,
    folders: Track<Vec<Folder>>,
}

impl<C: CatalogSource> PreloadCoordinator<C> {
    pub fn new(client: Arc<C>, page_limit: u32) -> Self {
        Self {
            client,
            page_limit,
            assets: Track::Idle,
            folders: Track::Idle,
        }
    }

    /// Start any idle track. Tracks already in flight or holding a result are
    /// left alone. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        if matches!(self.assets, Track::Idle) {
            debug!("Starting asset preload");
            let client = Arc::clone(&self.client);
            let limit = self.page_limit;
            self.assets = Track::Running(tokio::spawn(async move {
                match fetch_all_assets(&client, limit, || true).await {
                    Ok(assets) => assets,
                    Err(err) => {
                        warn!("Asset preload failed: {}", err);
                        None
                    }
                }
            }));
        }

        if matches!(self.folders, Track::Idle) {
            debug!("Starting folder preload");
            let client = Arc::clone(&self.client);
            self.folders = Track::Running(tokio::spawn(async move {
                Some(client.fetch_folders().await)
            }));
        }
    }

    /// Take the preloaded assets, waiting if the download is still running.
    pub async fn consume_assets(&mut self) -> Option<Vec<Asset>> {
        self.assets.consume("assets").await
    }

    /// Take the preloaded folders, waiting if the download is still running.
    pub async fn consume_folders(&mut self) -> Option<Vec<Folder>> {
        self.folders.consume("folders").await
    }

    pub fn state(&self) -> PreloadState {
        PreloadState {
            assets: self.assets.phase(),
            folders: self.folders.phase(),
        }
    }

    /// Drop both tracks, aborting running downloads.
    pub fn reset(&mut self) {
        self.assets.abort();
        self.folders.abort();
    }

    /// Point future preloads at a different catalog source.
    pub fn replace_client(&mut self, client: Arc<C>) {
        self.reset();
        self.client = client;
    }
}

impl<C> Drop for PreloadCoordinator<C> {
    fn drop(&mut self) {
        if let Track::Running(handle) = &self.assets {
            handle.abort();
        }
        if let Track::Running(handle) = &self.folders {
            handle.abort();
        }
    }
}
