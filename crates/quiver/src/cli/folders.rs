//! `quiver folders`: list one level of the folder tree.

use anyhow::{bail, Context, Result};
use quiver_protocol::FolderId;
use quiver_sync::{folder_counts, CatalogSnapshot, CatalogSync};
use serde::Serialize;

use super::context::{load_config, open_client, GlobalArgs};
use super::output::{print_json, print_table};

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FolderRow {
    pub id: String,
    pub name: String,
    pub path: String,
    pub assets: usize,
    pub subfolders: usize,
}

/// Children of `parent` (roots when `None`) with their asset counts.
pub fn folder_rows(
    snapshot: &CatalogSnapshot,
    parent: Option<&FolderId>,
) -> Result<Vec<FolderRow>> {
    if let Some(parent) = parent {
        if !snapshot.folders.contains(parent) {
            bail!("Folder not found: {}", parent);
        }
    }
    let counts = folder_counts(&snapshot.assets);
    Ok(snapshot
        .folders
        .children_of(parent)
        .iter()
        .map(|f| FolderRow {
            id: f.id.to_string(),
            name: f.name.clone(),
            path: snapshot.folders.display_path(&f.id),
            assets: counts.folder(&f.id),
            subfolders: snapshot.folders.children_of(Some(&f.id)).len(),
        })
        .collect())
}

pub async fn run(globals: &GlobalArgs, parent: Option<String>, json: bool) -> Result<()> {
    let config = load_config(globals)?;
    let sync = CatalogSync::new(open_client(&config)?, config.page_limit);
    sync.sync().await.context("Catalog sync failed")?;

    let parent = parent.map(FolderId::new);
    let rows = folder_rows(&sync.snapshot(), parent.as_ref())?;
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No folders.");
        return Ok(());
    }
    print_table(
        &["ID", "Name", "Path", "Assets", "Subfolders"],
        rows.into_iter()
            .map(|r| {
                vec![
                    r.id,
                    r.name,
                    r.path,
                    r.assets.to_string(),
                    r.subfolders.to_string(),
                ]
            })
            .collect(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_test_utils::{asset, folder, MockCatalog};
    use std::sync::Arc;

    async fn snapshot() -> CatalogSnapshot {
        let catalog = Arc::new(MockCatalog::new(
            vec![asset("a", Some("B")), asset("b", Some("B")), asset("c", Some("A"))],
            vec![folder("A", None), folder("B", Some("A")), folder("C", Some("B"))],
        ));
        let sync = CatalogSync::new(catalog, 100);
        sync.sync().await.unwrap();
        sync.snapshot()
    }

    #[tokio::test]
    async fn test_rows_for_child_level() {
        let snapshot = snapshot().await;
        let rows = folder_rows(&snapshot, Some(&FolderId::new("A"))).unwrap();
        assert_eq!(
            rows,
            vec![FolderRow {
                id: "B".to_string(),
                name: "Folder B".to_string(),
                path: "Folder A / Folder B".to_string(),
                assets: 2,
                subfolders: 1,
            }]
        );

        let roots = folder_rows(&snapshot, None).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].assets, 1);
    }

    #[tokio::test]
    async fn test_unknown_parent_is_an_error() {
        let snapshot = snapshot().await;
        assert!(folder_rows(&snapshot, Some(&FolderId::new("nope"))).is_err());
    }
}
