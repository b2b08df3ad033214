//! Catalog cache: the authoritative in-memory asset set and folder index.
//!
//! Only the commit step of a current-session sync writes here. Readers take a
//! [`CatalogSnapshot`], which is a set of `Arc`s, and run filters over it
//! without holding the lock.

use chrono::{DateTime, Utc};
use quiver_protocol::{Asset, AssetId, Folder};
use std::sync::{Arc, PoisonError, RwLock};

use crate::folder_index::FolderIndex;
use crate::session::{SessionManager, SessionToken};

/// Immutable view of one committed sync.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub assets: Arc<Vec<Asset>>,
    pub folders: Arc<FolderIndex>,
    pub synced_at: Option<DateTime<Utc>>,
    pub token: Option<SessionToken>,
}

impl CatalogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn find(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| &a.id == id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    inner: Arc<RwLock<CatalogSnapshot>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole catalog if `token` is still the current session.
    ///
    /// The token is checked under the write lock. A newer session that begins
    /// after the check commits after this one, so the newest cycle always
    /// ends up in the cache. Returns whether the commit happened.
    pub fn commit_if_current(
        &self,
        sessions: &SessionManager,
        token: SessionToken,
        assets: Vec<Asset>,
        folders: &[Folder],
    ) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !sessions.is_current(token) {
            return false;
        }
        *guard = CatalogSnapshot {
            assets: Arc::new(assets),
            folders: Arc::new(FolderIndex::build(folders)),
            synced_at: Some(Utc::now()),
            token: Some(token),
        };
        true
    }

    /// Drop everything, e.g. after a credential change.
    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = CatalogSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_test_utils::{folder, numbered_assets};

    #[test]
    fn test_commit_requires_current_token() {
        let cache = CatalogCache::new();
        let sessions = SessionManager::new();
        let stale = sessions.begin();
        let current = sessions.begin();

        assert!(!cache.commit_if_current(&sessions, stale, numbered_assets("old", 2), &[]));
        assert!(cache.snapshot().is_empty());

        assert!(cache.commit_if_current(
            &sessions,
            current,
            numbered_assets("new", 3),
            &[folder("A", None)],
        ));
        let snapshot = cache.snapshot();
        assert_eq!(snapshot.assets.len(), 3);
        assert_eq!(snapshot.folders.len(), 1);
        assert_eq!(snapshot.token, Some(current));
        assert!(snapshot.synced_at.is_some());
    }

    #[test]
    fn test_snapshot_survives_clear() {
        let cache = CatalogCache::new();
        let sessions = SessionManager::new();
        let token = sessions.begin();
        cache.commit_if_current(&sessions, token, numbered_assets("a", 2), &[]);

        let held = cache.snapshot();
        cache.clear();
        assert_eq!(held.assets.len(), 2);
        assert!(cache.snapshot().is_empty());
        assert!(cache.snapshot().synced_at.is_none());
    }
}
