//! Rendering collaborator.

use quiver_protocol::{Asset, AssetId};
use serde::Serialize;

use crate::view::{FolderCounts, FolderSelector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Error,
}

/// Dismissible message shown above the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Everything a host needs to paint one frame of the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewUpdate {
    pub displayed: Vec<Asset>,
    pub selected_folder: FolderSelector,
    pub search_query: String,
    pub has_more: bool,
    pub total_matching: usize,
    pub counts: FolderCounts,
    pub status: Option<StatusMessage>,
}

pub trait ViewSink {
    /// Called after every view recompute.
    fn render(&mut self, update: &ViewUpdate);

    /// Called once per asset whose selection state changed.
    fn selection_changed(&mut self, _id: &AssetId, _selected: bool) {}
}

/// Sink that keeps every update, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub updates: Vec<ViewUpdate>,
    pub selection_events: Vec<(AssetId, bool)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ViewUpdate> {
        self.updates.last()
    }

    pub fn displayed_ids(&self) -> Vec<String> {
        self.last()
            .map(|u| u.displayed.iter().map(|a| a.id.to_string()).collect())
            .unwrap_or_default()
    }
}

impl ViewSink for RecordingSink {
    fn render(&mut self, update: &ViewUpdate) {
        self.updates.push(update.clone());
    }

    fn selection_changed(&mut self, id: &AssetId, selected: bool) {
        self.selection_events.push((id.clone(), selected));
    }
}
