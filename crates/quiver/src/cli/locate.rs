//! `quiver locate`: ask the catalog for an asset's download URL.

use anyhow::Result;
use quiver_protocol::AssetId;
use serde_json::json;

use super::context::{open_panel, GlobalArgs};
use super::output::print_json;

pub async fn run(globals: &GlobalArgs, asset_id: &str, json: bool) -> Result<()> {
    let mut panel = open_panel(globals)?;
    let id = AssetId::new(asset_id);
    let locator = panel.on_import(&id).await?;

    if json {
        return print_json(&json!({ "assetId": id, "url": locator.url }));
    }
    println!("{}", locator.url);
    Ok(())
}
