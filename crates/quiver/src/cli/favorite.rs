//! `quiver favorite`: toggle an asset's favorite flag in the local preferences.

use anyhow::Result;
use quiver_protocol::AssetId;
use quiver_sync::{JsonFilePreferences, Preferences};

use super::context::preferences_path;

pub fn toggle(prefs: &mut impl Preferences, id: &AssetId) -> bool {
    let favorite = !prefs.is_favorite(id);
    prefs.set_favorite(id, favorite);
    favorite
}

pub fn run(asset_id: &str) -> Result<()> {
    let mut prefs = JsonFilePreferences::open(preferences_path());
    let id = AssetId::new(asset_id);
    if toggle(&mut prefs, &id) {
        println!("Added {} to favorites", id);
    } else {
        println!("Removed {} from favorites", id);
    }
    Ok(())
}
