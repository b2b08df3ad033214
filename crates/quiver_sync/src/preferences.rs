//! Preferences collaborator: favorites and the last viewed folder.
//!
//! The panel only reads favorites (to resolve the `favorites` selector) and
//! saves/restores the last folder; it does not own this storage.

use quiver_protocol::AssetId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::view::FolderSelector;

pub trait Preferences {
    fn is_favorite(&self, id: &AssetId) -> bool;
    fn set_favorite(&mut self, id: &AssetId, favorite: bool);
    fn last_folder(&self) -> Option<FolderSelector>;
    fn set_last_folder(&mut self, selector: &FolderSelector);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPreferences {
    #[serde(default)]
    favorites: BTreeSet<AssetId>,
    #[serde(default)]
    last_folder: Option<FolderSelector>,
}

/// Preferences kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    stored: StoredPreferences,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_favorites<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AssetId>,
    {
        let mut prefs = Self::default();
        prefs.stored.favorites = ids.into_iter().map(Into::into).collect();
        prefs
    }
}

impl Preferences for MemoryPreferences {
    fn is_favorite(&self, id: &AssetId) -> bool {
        self.stored.favorites.contains(id)
    }

    fn set_favorite(&mut self, id: &AssetId, favorite: bool) {
        if favorite {
            self.stored.favorites.insert(id.clone());
        } else {
            self.stored.favorites.remove(id);
        }
    }

    fn last_folder(&self) -> Option<FolderSelector> {
        self.stored.last_folder.clone()
    }

    fn set_last_folder(&mut self, selector: &FolderSelector) {
        self.stored.last_folder = Some(selector.clone());
    }
}

/// Preferences persisted as JSON. Every change is written through; write
/// failures are logged and the in-memory state stays authoritative.
#[derive(Debug, Clone)]
pub struct JsonFilePreferences {
    path: PathBuf,
    stored: StoredPreferences,
}

impl JsonFilePreferences {
    /// Open the file, starting empty if it is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stored = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring unreadable preferences at {}: {}", path.display(), e);
                StoredPreferences::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredPreferences::default(),
            Err(e) => {
                warn!("Failed to read preferences at {}: {}", path.display(), e);
                StoredPreferences::default()
            }
        };
        Self { path, stored }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Err(e) = self.write() {
            warn!("Failed to save preferences to {}: {}", self.path.display(), e);
        }
    }

    fn write(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&self.stored)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl Preferences for JsonFilePreferences {
    fn is_favorite(&self, id: &AssetId) -> bool {
        self.stored.favorites.contains(id)
    }

    fn set_favorite(&mut self, id: &AssetId, favorite: bool) {
        let changed = if favorite {
            self.stored.favorites.insert(id.clone())
        } else {
            self.stored.favorites.remove(id)
        };
        if changed {
            self.persist();
        }
    }

    fn last_folder(&self) -> Option<FolderSelector> {
        self.stored.last_folder.clone()
    }

    fn set_last_folder(&mut self, selector: &FolderSelector) {
        if self.stored.last_folder.as_ref() != Some(selector) {
            self.stored.last_folder = Some(selector.clone());
            self.persist();
        }
    }
}
