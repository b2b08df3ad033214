//! Fixture builders for catalog records.

use quiver_protocol::{Asset, AssetId, Folder, FolderId};

/// Asset with no name, optionally inside a folder.
pub fn asset(id: &str, folder: Option<&str>) -> Asset {
    Asset {
        id: AssetId::new(id),
        name: None,
        folder_id: folder.map(FolderId::new),
        thumbnail: Some(format!("https://cdn.test/thumbs/{}", id)),
        size: Some(1024),
        upload_date: Some("2024-05-01T09:30:00Z".to_string()),
    }
}

pub fn named_asset(id: &str, name: &str, folder: Option<&str>) -> Asset {
    Asset {
        name: Some(name.to_string()),
        ..asset(id, folder)
    }
}

/// `n` unnamed assets `prefix-000`, `prefix-001`, ... in that order.
pub fn numbered_assets(prefix: &str, n: usize) -> Vec<Asset> {
    (0..n)
        .map(|i| asset(&format!("{}-{:03}", prefix, i), None))
        .collect()
}

pub fn folder(id: &str, parent: Option<&str>) -> Folder {
    Folder {
        id: FolderId::new(id),
        name: format!("Folder {}", id),
        parent_id: parent.map(FolderId::new),
    }
}
