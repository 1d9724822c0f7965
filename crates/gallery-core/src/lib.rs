// SPDX-License-Identifier: AGPL-3.0
// Gallery Core - Shared logic for all frontends
//
// This crate provides:
// - ArtworkGateway, the HTTP client for the artwork catalog
// - FavoritesStore for locally saved artworks
// - Session and GalleryController for browsing state
// - GallerySettings, SettingsStore and AppError
//
// Frontend-specific code lives in separate crates.

pub mod controller;
pub mod favorites;
pub mod gateway;
pub mod model;
pub mod session;
pub mod settings;
pub mod types;

// Re-export commonly used items
pub use controller::{collect_seed_artworks, GalleryController, LoadOutcome, SeedLoad};
pub use favorites::FavoritesStore;
pub use gateway::{resolve_image_url, ArtworkGateway, CatalogSource};
pub use model::{ArtworkRecord, CatalogPage, FavoriteKey, Pagination, SavedArtwork, Thumbnail};
pub use session::{Session, SessionStatus};
pub use settings::SettingsStore;
pub use types::{AppError, GallerySettings};
