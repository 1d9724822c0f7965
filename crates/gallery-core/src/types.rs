// SPDX-License-Identifier: AGPL-3.0
// Gallery Core - Settings and error types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base URL of the Art Institute of Chicago public API
pub const DEFAULT_API_BASE_URL: &str = "https://api.artic.edu/api/v1";

/// IIIF image server used when a response carries no `config.iiif_url`
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://www.artic.edu/iiif/2";

/// Artists searched, in order, to populate the default session
pub const DEFAULT_SEED_ARTISTS: [&str; 4] = ["Van Gogh", "Monet", "Rembrandt", "Picasso"];

/// Application settings (GUI-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GallerySettings {
    /// Catalog API root, without a trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Image server root used until a response overrides it
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    /// Artists searched for the default session, in order
    #[serde(default = "default_seed_artists")]
    pub seed_artists: Vec<String>,
    /// The default load stops once this many displayable artworks are collected
    #[serde(default = "default_seed_threshold")]
    pub seed_threshold: usize,
    /// Page size for plain catalog browsing
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    /// Value for the `AIC-User-Agent` header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Favorites database location. None means the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_image_base_url() -> String {
    DEFAULT_IMAGE_BASE_URL.to_string()
}

fn default_seed_artists() -> Vec<String> {
    DEFAULT_SEED_ARTISTS.iter().map(|a| a.to_string()).collect()
}

fn default_seed_threshold() -> usize {
    20
}

fn default_page_limit() -> u32 {
    20
}

fn default_user_agent() -> String {
    format!("gallery/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            image_base_url: default_image_base_url(),
            seed_artists: default_seed_artists(),
            seed_threshold: default_seed_threshold(),
            page_limit: default_page_limit(),
            user_agent: default_user_agent(),
            database_path: None,
        }
    }
}

impl GallerySettings {
    /// Reject settings the gateway or controller cannot work with
    pub fn validate(&self) -> Result<(), AppError> {
        url::Url::parse(&self.api_base_url).map_err(|e| {
            AppError::InvalidConfig(format!("apiBaseUrl '{}': {}", self.api_base_url, e))
        })?;
        url::Url::parse(&self.image_base_url).map_err(|e| {
            AppError::InvalidConfig(format!("imageBaseUrl '{}': {}", self.image_base_url, e))
        })?;
        if self.page_limit == 0 {
            return Err(AppError::InvalidConfig(
                "pageLimit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to load artworks for '{artist}': {source}")]
    LoadFailed {
        artist: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileIo(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GallerySettings::default();
        assert_eq!(settings.api_base_url, "https://api.artic.edu/api/v1");
        assert_eq!(settings.image_base_url, "https://www.artic.edu/iiif/2");
        assert_eq!(settings.seed_threshold, 20);
        assert_eq!(
            settings.seed_artists,
            vec!["Van Gogh", "Monet", "Rembrandt", "Picasso"]
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: GallerySettings =
            serde_json::from_str(r#"{"seedArtists": ["Hokusai"]}"#).unwrap();
        assert_eq!(settings.seed_artists, vec!["Hokusai"]);
        assert_eq!(settings.page_limit, 20);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let settings = GallerySettings {
            api_base_url: "not a url".to_string(),
            ..GallerySettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_failure_keeps_source() {
        use std::error::Error;

        let err = AppError::LoadFailed {
            artist: "Monet".to_string(),
            source: Box::new(AppError::Network("timed out".to_string())),
        };
        assert!(err.to_string().contains("Monet"));
        assert!(err.source().is_some());
    }
}
