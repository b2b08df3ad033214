//! Error types for catalog synchronization

use quiver_client::ClientError;
use thiserror::Error;

/// A sync cycle failed and committed nothing.
///
/// Superseded cycles are not errors; they finish as
/// [`SyncOutcome::Superseded`](crate::sync::SyncOutcome::Superseded).
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sync failed: page {page} could not be fetched: {source}")]
    PageFailed {
        page: u32,
        #[source]
        source: ClientError,
    },

    #[error("Sync failed: catalog reports {total} assets, too many to fetch at {limit} per page")]
    TooManyPages { total: u64, limit: u32 },

    #[error("Sync failed: page task aborted: {0}")]
    TaskFailed(String),

    #[error("Import failed for {asset_id}: {source}")]
    Import {
        asset_id: String,
        #[source]
        source: ClientError,
    },
}

impl SyncError {
    /// Page number whose failure aborted the cycle, if any.
    pub fn failed_page(&self) -> Option<u32> {
        match self {
            SyncError::PageFailed { page, .. } => Some(*page),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
