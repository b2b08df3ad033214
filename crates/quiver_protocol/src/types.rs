//! Catalog records as delivered by the remote API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, FolderId};

/// A remote image or media item.
///
/// Assets are immutable once fetched. A full re-sync replaces the whole set;
/// nothing patches an asset in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "folder_id")]
    pub folder_id: Option<FolderId>,
    #[serde(default, alias = "thumbnailUrl", alias = "thumbnail_url")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    /// Raw upload timestamp. Kept as text because the catalog does not
    /// guarantee a format; see [`Asset::uploaded_at`].
    #[serde(default, alias = "upload_date", alias = "createdAt")]
    pub upload_date: Option<String>,
}

impl Asset {
    /// Name shown to the user, falling back to the id when the catalog omits it.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.id.as_str(),
        }
    }

    /// Upload time when the catalog sent an RFC 3339 timestamp.
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.upload_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// A real folder in the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "parent_id")]
    pub parent_id: Option<FolderId>,
}

/// One page of the asset listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssetPage {
    pub assets: Vec<Asset>,
    /// Total asset count across all pages, as reported by the catalog.
    pub total: u64,
}

/// Where the import flow can download an asset from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLocator {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut asset = Asset {
            id: AssetId::new("brand/logo.png"),
            name: None,
            folder_id: None,
            thumbnail: None,
            size: None,
            upload_date: None,
        };
        assert_eq!(asset.display_name(), "brand/logo.png");

        asset.name = Some(String::new());
        assert_eq!(asset.display_name(), "brand/logo.png");

        asset.name = Some("Logo".to_string());
        assert_eq!(asset.display_name(), "Logo");
    }

    #[test]
    fn test_uploaded_at_parses_rfc3339_only() {
        let mut asset: Asset = serde_json::from_str(
            r#"{"id":"a","uploadDate":"2024-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(asset.uploaded_at().is_some());

        asset.upload_date = Some("last tuesday".to_string());
        assert!(asset.uploaded_at().is_none());
    }

    #[test]
    fn test_folder_accepts_snake_case_parent() {
        let folder: Folder =
            serde_json::from_str(r#"{"id":"b","name":"B","parent_id":"a"}"#).unwrap();
        assert_eq!(folder.parent_id, Some(FolderId::new("a")));
    }
}
