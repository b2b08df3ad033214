//! Multi-select state and the preview cursor.
//!
//! Selection is a set of asset ids, independent of which assets the current
//! view shows. The preview cursor moves only within the displayed slice;
//! stepping past either end does nothing (loading more is always explicit).

use quiver_protocol::{Asset, AssetId};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<AssetId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &AssetId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn is_selected(&self, id: &AssetId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids, sorted for stable output.
    pub fn ids(&self) -> Vec<AssetId> {
        let mut ids: Vec<AssetId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Deselect everything. Returns each previously selected id exactly once,
    /// so callers can notify every affected item.
    pub fn clear(&mut self) -> Vec<AssetId> {
        let mut cleared: Vec<AssetId> = self.ids.drain().collect();
        cleared.sort();
        cleared
    }

    /// Selected assets in catalog order. Ids no longer in the catalog are skipped.
    pub fn resolve<'a>(&self, assets: &'a [Asset]) -> Vec<&'a Asset> {
        assets.iter().filter(|a| self.ids.contains(&a.id)).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreviewCursor {
    current: Option<AssetId>,
}

impl PreviewCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&AssetId> {
        self.current.as_ref()
    }

    pub fn open(&mut self, id: AssetId) {
        self.current = Some(id);
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    /// `(index, len)` of the previewed asset within `displayed`.
    pub fn position(&self, displayed: &[Asset]) -> Option<(usize, usize)> {
        let current = self.current.as_ref()?;
        displayed
            .iter()
            .position(|a| &a.id == current)
            .map(|idx| (idx, displayed.len()))
    }

    /// Step to the next displayed asset. No-op at the end of the slice or when
    /// the previewed asset is not displayed.
    pub fn next<'a>(&mut self, displayed: &'a [Asset]) -> Option<&'a Asset> {
        self.step(displayed, 1)
    }

    /// Step to the previous displayed asset. No-op at the start of the slice.
    pub fn prev<'a>(&mut self, displayed: &'a [Asset]) -> Option<&'a Asset> {
        self.step(displayed, -1)
    }

    fn step<'a>(&mut self, displayed: &'a [Asset], delta: isize) -> Option<&'a Asset> {
        let (idx, len) = self.position(displayed)?;
        let target = idx.checked_add_signed(delta).filter(|&t| t < len)?;
        let asset = &displayed[target];
        self.current = Some(asset.id.clone());
        Some(asset)
    }
}
