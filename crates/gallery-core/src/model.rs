// SPDX-License-Identifier: AGPL-3.0
// Gallery Core - Catalog and favorites records
//
// Wire records mirror the catalog's snake_case JSON. Only `id`, `title` and
// `artist_display` are required; everything else may be missing or null.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single artwork as returned by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkRecord {
    pub id: i64,
    pub title: String,
    pub artist_display: String,
    #[serde(default)]
    pub date_display: Option<String>,
    /// Absent means the artwork cannot be displayed
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default)]
    pub artwork_type_title: Option<String>,
    #[serde(default)]
    pub department_title: Option<String>,
    #[serde(default)]
    pub artist_title: Option<String>,
}

impl ArtworkRecord {
    /// Whether the record has an image to show
    pub fn has_image(&self) -> bool {
        self.image_id.is_some()
    }

    /// Business key used by the favorites store
    pub fn favorite_key(&self) -> FavoriteKey {
        FavoriteKey::new(&self.title, &self.artist_display)
    }
}

/// Thumbnail hint. Dimensions are advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Pagination metadata of a catalog response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u64>,
}

/// Raw response envelope: `{data, pagination?, config?}`
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogEnvelope {
    pub data: Vec<ArtworkRecord>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub config: Option<CatalogConfig>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogConfig {
    #[serde(default)]
    pub iiif_url: Option<String>,
}

/// One decoded page of catalog results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub data: Vec<ArtworkRecord>,
    pub pagination: Option<Pagination>,
    /// Image server override announced by the API, if any
    pub image_base_url: Option<String>,
}

impl From<CatalogEnvelope> for CatalogPage {
    fn from(envelope: CatalogEnvelope) -> Self {
        Self {
            data: envelope.data,
            pagination: envelope.pagination,
            image_base_url: envelope.config.and_then(|c| c.iiif_url),
        }
    }
}

impl CatalogPage {
    /// Records that can be displayed, in catalog order
    pub fn into_displayable(self) -> Vec<ArtworkRecord> {
        self.data.into_iter().filter(ArtworkRecord::has_image).collect()
    }
}

/// (title, artist) pair identifying a saved artwork
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FavoriteKey {
    pub title: String,
    pub artist: String,
}

impl FavoriteKey {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// An artwork persisted in the local favorites database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedArtwork {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Resolved at save time and never recomputed
    pub image_url: String,
    /// Copy of the department title
    pub category: Option<String>,
    pub date_display: Option<String>,
    pub artwork_type_title: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl SavedArtwork {
    pub fn key(&self) -> FavoriteKey {
        FavoriteKey::new(&self.title, &self.artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"{
        "preference": null,
        "pagination": {"total": 2, "limit": 100, "offset": 0, "total_pages": 1, "current_page": 1},
        "data": [
            {
                "_score": 120.5,
                "id": 27992,
                "title": "A Sunday on La Grande Jatte — 1884",
                "artist_display": "Georges Seurat\nFrench, 1859-1891",
                "date_display": "1884-86",
                "image_id": "1adf2696-8489-499b-cad2-821d7fde4b33",
                "thumbnail": {"lqip": "data:image/gif;base64,R0l", "width": 3000, "height": 2010, "alt_text": "Park scene"},
                "artwork_type_title": "Painting",
                "department_title": "Painting and Sculpture of Europe",
                "artist_title": "Georges Seurat"
            },
            {
                "id": 1,
                "title": "Untitled fragment",
                "artist_display": "Unknown",
                "image_id": null,
                "thumbnail": null
            }
        ],
        "config": {"iiif_url": "https://www.artic.edu/iiif/2", "website_url": "http://www.artic.edu"}
    }"#;

    #[test]
    fn test_envelope_decodes_optional_fields() {
        let envelope: CatalogEnvelope = serde_json::from_str(SEARCH_BODY).unwrap();
        let page = CatalogPage::from(envelope);

        assert_eq!(page.data.len(), 2);
        assert_eq!(
            page.image_base_url.as_deref(),
            Some("https://www.artic.edu/iiif/2")
        );
        assert_eq!(page.pagination.as_ref().unwrap().total_pages, Some(1));

        let first = &page.data[0];
        assert_eq!(first.thumbnail.as_ref().unwrap().width, Some(3000));
        assert_eq!(first.artist_title.as_deref(), Some("Georges Seurat"));

        let second = &page.data[1];
        assert!(second.date_display.is_none());
        assert!(!second.has_image());
    }

    #[test]
    fn test_into_displayable_drops_records_without_image() {
        let envelope: CatalogEnvelope = serde_json::from_str(SEARCH_BODY).unwrap();
        let records = CatalogPage::from(envelope).into_displayable();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 27992);
    }

    #[test]
    fn test_missing_config_means_no_override() {
        let envelope: CatalogEnvelope = serde_json::from_str(r#"{"data": []}"#).unwrap();
        let page = CatalogPage::from(envelope);
        assert!(page.image_base_url.is_none());
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_favorite_key_uses_artist_display() {
        let envelope: CatalogEnvelope = serde_json::from_str(SEARCH_BODY).unwrap();
        let page = CatalogPage::from(envelope);
        let key = page.data[0].favorite_key();
        assert_eq!(key.artist, "Georges Seurat\nFrench, 1859-1891");
    }
}
