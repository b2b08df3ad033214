//! Folder Index - lookup and tree structures over the flat folder list
//!
//! Rebuilt from scratch whenever a folder list arrives. Construction is O(n):
//! one pass creates the child buckets, a second pass files each folder under
//! its parent or among the roots.
//!
//! The catalog is expected to send an acyclic parent graph, but nothing here
//! trusts that: a dangling or self-referencing `parent_id` makes a folder a
//! root, and path walks are bounded by the folder count.

use quiver_protocol::{Folder, FolderId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct FolderIndex {
    by_id: HashMap<FolderId, Folder>,
    children_of: HashMap<FolderId, Vec<Folder>>,
    roots: Vec<Folder>,
}

impl FolderIndex {
    pub fn build(folders: &[Folder]) -> Self {
        let mut by_id: HashMap<FolderId, Folder> = HashMap::with_capacity(folders.len());
        let mut children_of: HashMap<FolderId, Vec<Folder>> =
            HashMap::with_capacity(folders.len());

        for folder in folders {
            by_id.insert(folder.id.clone(), folder.clone());
            children_of.entry(folder.id.clone()).or_default();
        }

        let mut roots = Vec::new();
        for folder in folders {
            match folder.parent_id.as_ref() {
                Some(parent) if parent != &folder.id && by_id.contains_key(parent) => {
                    children_of
                        .entry(parent.clone())
                        .or_default()
                        .push(folder.clone());
                }
                _ => roots.push(folder.clone()),
            }
        }

        Self {
            by_id,
            children_of,
            roots,
        }
    }

    pub fn get(&self, id: &FolderId) -> Option<&Folder> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &FolderId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn roots(&self) -> &[Folder] {
        &self.roots
    }

    /// Direct children of `parent`, or the roots for `None`. Never descends.
    pub fn children_of(&self, parent: Option<&FolderId>) -> &[Folder] {
        match parent {
            None => &self.roots,
            Some(id) => self
                .children_of
                .get(id)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    /// Folders from the root down to `id` (inclusive).
    ///
    /// Stops at a null or unresolved parent. A cyclic parent chain is cut at
    /// the first repeated folder, so the result always ends at `id`. Unknown
    /// ids yield an empty path.
    pub fn path_to(&self, id: &FolderId) -> Vec<Folder> {
        let mut path: Vec<Folder> = Vec::new();
        let mut seen: HashSet<&FolderId> = HashSet::new();
        let mut current = Some(id);

        while let Some(folder_id) = current {
            if path.len() >= self.by_id.len() {
                tracing::warn!(folder = %id, "Folder path exceeded folder count, truncating");
                break;
            }
            let Some(folder) = self.by_id.get(folder_id) else {
                break;
            };
            if !seen.insert(&folder.id) {
                tracing::warn!(folder = %id, "Cyclic folder parent chain, truncating path");
                break;
            }
            path.push(folder.clone());
            current = folder.parent_id.as_ref();
        }

        path.reverse();
        path
    }

    /// Display path such as `Brand / Logos / 2024`.
    pub fn display_path(&self, id: &FolderId) -> String {
        self.path_to(id)
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}
