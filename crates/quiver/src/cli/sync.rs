//! `quiver sync`: download the catalog once and summarize it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quiver_sync::{CatalogSnapshot, CatalogSync, SyncOutcome};
use serde::Serialize;

use super::context::{load_config, open_client, GlobalArgs};
use super::output::{print_json, print_table};

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub assets: usize,
    pub folders: usize,
    pub root_folders: usize,
    pub unfiled_assets: usize,
    pub synced_at: Option<DateTime<Utc>>,
}

impl SyncSummary {
    pub fn from_snapshot(snapshot: &CatalogSnapshot) -> Self {
        Self {
            assets: snapshot.assets.len(),
            folders: snapshot.folders.len(),
            root_folders: snapshot.folders.roots().len(),
            unfiled_assets: snapshot.assets.iter().filter(|a| a.folder_id.is_none()).count(),
            synced_at: snapshot.synced_at,
        }
    }
}

pub async fn run(globals: &GlobalArgs, json: bool) -> Result<()> {
    let config = load_config(globals)?;
    let sync = CatalogSync::new(open_client(&config)?, config.page_limit);

    let outcome = sync.sync().await.context("Catalog sync failed")?;
    if outcome == SyncOutcome::Superseded {
        anyhow::bail!("Catalog sync was superseded before it could finish");
    }

    let summary = SyncSummary::from_snapshot(&sync.snapshot());
    if json {
        return print_json(&summary);
    }

    let synced_at = summary
        .synced_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string());
    print_table(
        &["Catalog", "Value"],
        vec![
            vec!["Assets".to_string(), summary.assets.to_string()],
            vec!["Unfiled assets".to_string(), summary.unfiled_assets.to_string()],
            vec!["Folders".to_string(), summary.folders.to_string()],
            vec!["Root folders".to_string(), summary.root_folders.to_string()],
            vec!["Synced at".to_string(), synced_at],
        ],
    );
    Ok(())
}
