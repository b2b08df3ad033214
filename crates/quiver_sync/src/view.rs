//! View Engine - derived folder/search/pagination views over the cache
//!
//! Everything here is a pure read over an immutable asset slice:
//!
//! ```text
//! all assets --filter_by_folder--> folder view --filter_by_search--> matches
//!            --visible_slice(visible_count)--> displayed (+ has_more)
//! ```
//!
//! Folder filtering is one level: selecting a folder shows the assets filed
//! directly in it, not those in its subfolders.

use quiver_protocol::{Asset, AssetId, FolderId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

const ALL_KEY: &str = "all";
const FAVORITES_KEY: &str = "favorites";

/// What the user picked in the folder sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum FolderSelector {
    All,
    Favorites,
    Folder(FolderId),
}

impl FolderSelector {
    /// Parse the persisted/CLI form: `all`, `favorites`, or a folder id.
    pub fn parse(value: &str) -> Self {
        match value {
            ALL_KEY => FolderSelector::All,
            FAVORITES_KEY => FolderSelector::Favorites,
            id => FolderSelector::Folder(FolderId::new(id)),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            FolderSelector::All => ALL_KEY,
            FolderSelector::Favorites => FAVORITES_KEY,
            FolderSelector::Folder(id) => id.as_str(),
        }
    }

    pub fn folder_id(&self) -> Option<&FolderId> {
        match self {
            FolderSelector::Folder(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for FolderSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<String> for FolderSelector {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FolderSelector> for String {
    fn from(value: FolderSelector) -> Self {
        value.key().to_string()
    }
}

/// A selector resolved into something the filter can apply directly.
/// Favorites arrive here already resolved into an id set.
#[derive(Debug, Clone, Copy)]
pub enum FolderScope<'a> {
    All,
    Folder(&'a FolderId),
    Members(&'a HashSet<AssetId>),
}

pub fn filter_by_folder<'a>(assets: &'a [Asset], scope: FolderScope<'_>) -> Vec<&'a Asset> {
    match scope {
        FolderScope::All => assets.iter().collect(),
        FolderScope::Folder(folder) => assets
            .iter()
            .filter(|a| a.folder_id.as_ref() == Some(folder))
            .collect(),
        FolderScope::Members(ids) => assets.iter().filter(|a| ids.contains(&a.id)).collect(),
    }
}

/// Case-insensitive substring match on the display name (name, else id).
/// A blank query keeps everything.
pub fn filter_by_search<'a>(assets: &[&'a Asset], query: &str) -> Vec<&'a Asset> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return assets.to_vec();
    }
    assets
        .iter()
        .copied()
        .filter(|a| a.display_name().to_lowercase().contains(&needle))
        .collect()
}

/// The first `visible_count` matches.
#[derive(Debug, Clone, Copy)]
pub struct VisibleSlice<'s, 'a> {
    pub items: &'s [&'a Asset],
    pub has_more: bool,
}

pub fn visible_slice<'s, 'a>(
    filtered: &'s [&'a Asset],
    visible_count: usize,
) -> VisibleSlice<'s, 'a> {
    let end = visible_count.min(filtered.len());
    VisibleSlice {
        items: &filtered[..end],
        has_more: end < filtered.len(),
    }
}

/// Asset counts per folder, for sidebar badges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderCounts {
    pub all: usize,
    pub by_folder: HashMap<FolderId, usize>,
}

impl FolderCounts {
    pub fn folder(&self, id: &FolderId) -> usize {
        self.by_folder.get(id).copied().unwrap_or(0)
    }
}

/// One pass over the assets. Assets without a folder only count toward `all`.
pub fn folder_counts(assets: &[Asset]) -> FolderCounts {
    let mut counts = FolderCounts {
        all: assets.len(),
        by_folder: HashMap::new(),
    };
    for asset in assets {
        if let Some(folder) = &asset.folder_id {
            *counts.by_folder.entry(folder.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// User-controlled inputs of the view. Everything else is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// `None` until the first folder selection (or restore) happens.
    pub selected: Option<FolderSelector>,
    pub search_query: String,
    pub visible_count: usize,
    increment: usize,
}

impl ViewState {
    pub fn new(increment: usize) -> Self {
        let increment = increment.max(1);
        Self {
            selected: None,
            search_query: String::new(),
            visible_count: increment,
            increment,
        }
    }

    pub fn increment(&self) -> usize {
        self.increment
    }

    /// The selector filters run with; `All` before any selection.
    pub fn effective_selector(&self) -> &FolderSelector {
        self.selected.as_ref().unwrap_or(&FolderSelector::All)
    }

    /// Change folder; pagination restarts from the first page.
    pub fn select(&mut self, selector: FolderSelector) {
        self.selected = Some(selector);
        self.visible_count = self.increment;
    }

    /// Change the search query; pagination restarts from the first page.
    /// Returns false when the query did not change.
    pub fn set_query(&mut self, query: &str) -> bool {
        if self.search_query == query {
            return false;
        }
        self.search_query = query.to_string();
        self.visible_count = self.increment;
        true
    }

    pub fn load_more(&mut self) {
        self.visible_count = self.visible_count.saturating_add(self.increment);
    }
}

/// Owned result of one view recompute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogView {
    pub displayed: Vec<Asset>,
    pub has_more: bool,
    /// Matches before the visible-count slice.
    pub total_matching: usize,
}

pub fn compute_view(
    assets: &[Asset],
    scope: FolderScope<'_>,
    query: &str,
    visible_count: usize,
) -> CatalogView {
    let in_folder = filter_by_folder(assets, scope);
    let matches = filter_by_search(&in_folder, query);
    let slice = visible_slice(&matches, visible_count);
    CatalogView {
        displayed: slice.items.iter().map(|a| (*a).clone()).collect(),
        has_more: slice.has_more,
        total_matching: matches.len(),
    }
}
