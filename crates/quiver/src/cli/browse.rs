//! `quiver browse`: render the panel grid for a folder and search query.

use anyhow::{Context, Result};
use quiver_sync::{FolderIndex, FolderSelector, ViewUpdate};
use tracing::debug;

use super::context::{open_panel, GlobalArgs};
use super::output::{format_size, format_uploaded, print_json, print_table};

#[derive(Debug, Clone)]
pub struct BrowseArgs {
    pub folder: Option<String>,
    pub search: Option<String>,
    pub pages: usize,
    pub json: bool,
}

pub async fn run(globals: &GlobalArgs, args: BrowseArgs) -> Result<()> {
    let mut panel = open_panel(globals)?;
    panel.start_preload();
    panel.initial_load().await.context("Failed to load catalog")?;

    if let Some(folder) = &args.folder {
        panel.select_folder(FolderSelector::parse(folder));
    }
    if let Some(query) = &args.search {
        panel.set_search(query);
    }
    for _ in 1..args.pages.max(1) {
        if !panel.load_more() {
            break;
        }
    }

    debug!(frames = panel.sink().frames(), "Browse view ready");
    let update = panel
        .sink()
        .latest()
        .context("Panel produced no view")?;
    if args.json {
        return print_json(update);
    }

    let folders = panel.snapshot().folders;
    if update.displayed.is_empty() {
        println!("No assets in {}.", selector_label(&update.selected_folder, &folders));
    } else {
        print_table(
            &["#", "ID", "Name", "Folder", "Size", "Uploaded"],
            grid_rows(update, &folders),
        );
    }
    println!("{}", footer(update, &folders));
    Ok(())
}

pub fn grid_rows(update: &ViewUpdate, folders: &FolderIndex) -> Vec<Vec<String>> {
    update
        .displayed
        .iter()
        .enumerate()
        .map(|(idx, asset)| {
            let folder = match &asset.folder_id {
                Some(id) if folders.contains(id) => folders.display_path(id),
                Some(id) => id.to_string(),
                None => "-".to_string(),
            };
            vec![
                (idx + 1).to_string(),
                asset.id.to_string(),
                asset.display_name().to_string(),
                folder,
                asset.size.map(format_size).unwrap_or_else(|| "-".to_string()),
                format_uploaded(asset),
            ]
        })
        .collect()
}

fn selector_label(selector: &FolderSelector, folders: &FolderIndex) -> String {
    match selector {
        FolderSelector::All => "all assets".to_string(),
        FolderSelector::Favorites => "favorites".to_string(),
        FolderSelector::Folder(id) if folders.contains(id) => folders.display_path(id),
        FolderSelector::Folder(id) => format!("folder {}", id),
    }
}

pub fn footer(update: &ViewUpdate, folders: &FolderIndex) -> String {
    let mut line = format!(
        "Showing {} of {} in {}",
        update.displayed.len(),
        update.total_matching,
        selector_label(&update.selected_folder, folders)
    );
    if !update.search_query.trim().is_empty() {
        line.push_str(&format!(" matching \"{}\"", update.search_query.trim()));
    }
    if update.has_more {
        line.push_str(" (more available, use --pages)");
    }
    line
}
