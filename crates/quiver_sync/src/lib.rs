//! Quiver Sync - catalog synchronization and the panel view engine
//!
//! Downloads the remote asset catalog (paginated, pages fetched in parallel),
//! keeps it in an in-memory cache guarded by session tokens, and derives the
//! folder/search/pagination view the panel shows.
//!
//! # Architecture
//!
//! ```text
//! CatalogSource (quiver_client)
//!        |
//!  PreloadCoordinator --hand-off--> CatalogSync --commit_if_current--> CatalogCache
//!                                        ^                                  |
//!                                  SessionManager                     CatalogSnapshot
//!                                                                          |
//!                    PanelController --compute_view--> ViewUpdate --> ViewSink
//! ```
//!
//! Only a cycle whose session token is still current may commit. A cycle
//! overtaken by a newer one is discarded silently.

pub mod cache;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod folder_index;
pub mod preferences;
pub mod preload;
pub mod selection;
pub mod session;
pub mod sink;
pub mod sync;
pub mod timer;
pub mod view;

pub use cache::{CatalogCache, CatalogSnapshot};
pub use controller::PanelController;
pub use error::{Result, SyncError};
pub use fetch::{fetch_all_assets, page_count};
pub use folder_index::FolderIndex;
pub use preferences::{JsonFilePreferences, MemoryPreferences, Preferences};
pub use preload::{PreloadCoordinator, PreloadPhase, PreloadState};
pub use selection::{PreviewCursor, Selection};
pub use session::{SessionManager, SessionToken};
pub use sink::{RecordingSink, StatusKind, StatusMessage, ViewSink, ViewUpdate};
pub use sync::{CatalogSync, SyncOutcome};
pub use timer::CancellableTimer;
pub use view::{
    compute_view, filter_by_folder, filter_by_search, folder_counts, visible_slice, CatalogView,
    FolderCounts, FolderScope, FolderSelector, ViewState, VisibleSlice,
};
