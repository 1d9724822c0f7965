// SPDX-License-Identifier: AGPL-3.0
// Gallery Core - Settings persistence
//
// Settings are stored in a local JSON file. The favorites database lives
// in the platform data directory unless configured otherwise.

use crate::types::{AppError, GallerySettings};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

const DATABASE_FILE: &str = "favorites.db";

/// In-memory cache of settings, persisted to disk on changes
pub struct SettingsStore {
    settings: RwLock<GallerySettings>,
    file_path: PathBuf,
}

impl SettingsStore {
    /// Create a settings store in the platform config directory
    pub fn new() -> Result<Self, AppError> {
        let file_path = Self::get_settings_path()?;
        Self::with_path(file_path)
    }

    /// Create a settings store backed by an explicit file
    pub fn with_path(file_path: PathBuf) -> Result<Self, AppError> {
        tracing::info!("Settings file path: {:?}", file_path);

        let settings = if file_path.exists() {
            let content = fs::read_to_string(&file_path)
                .map_err(|e| AppError::FileIo(format!("Failed to read settings: {}", e)))?;

            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse settings, using defaults: {}", e);
                GallerySettings::default()
            })
        } else {
            tracing::info!("No settings file found, using defaults");
            GallerySettings::default()
        };

        let store = Self {
            settings: RwLock::new(settings),
            file_path,
        };

        if !store.file_path.exists() {
            tracing::info!("Creating initial settings file");
            store.persist()?;
        }

        Ok(store)
    }

    fn project_dirs() -> Result<directories::ProjectDirs, AppError> {
        directories::ProjectDirs::from("org", "gallery", "gallery")
            .ok_or_else(|| AppError::FileIo("Could not determine config directory".to_string()))
    }

    /// Get the path to the settings file
    fn get_settings_path() -> Result<PathBuf, AppError> {
        let config_dir = Self::project_dirs()?.config_dir().to_path_buf();

        fs::create_dir_all(&config_dir)
            .map_err(|e| AppError::FileIo(format!("Failed to create config dir: {}", e)))?;

        Ok(config_dir.join("settings.json"))
    }

    /// Persist settings to disk
    fn persist(&self) -> Result<(), AppError> {
        let settings = self.get();

        let content = serde_json::to_string_pretty(&settings)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.file_path, content)
            .map_err(|e| AppError::FileIo(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Get current settings
    pub fn get(&self) -> GallerySettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate, replace and persist settings
    pub fn update(&self, new_settings: GallerySettings) -> Result<(), AppError> {
        new_settings.validate()?;
        {
            let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
            *settings = new_settings;
        }

        let result = self.persist();
        match &result {
            Ok(()) => tracing::info!("Settings persisted successfully"),
            Err(e) => tracing::error!("Failed to persist settings: {}", e),
        }
        result
    }

    /// Append an artist to the default load
    pub fn add_seed_artist(&self, artist: String) -> Result<(), AppError> {
        {
            let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
            if !settings.seed_artists.contains(&artist) {
                settings.seed_artists.push(artist);
            }
        }
        self.persist()
    }

    /// Drop an artist from the default load
    pub fn remove_seed_artist(&self, artist: &str) -> Result<(), AppError> {
        {
            let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
            settings.seed_artists.retain(|a| a != artist);
        }
        self.persist()
    }

    /// Where the favorites database lives: the configured path, or the
    /// platform data directory
    pub fn database_path(&self) -> Result<PathBuf, AppError> {
        if let Some(path) = self.get().database_path {
            return Ok(path);
        }
        Ok(Self::project_dirs()?.data_dir().join(DATABASE_FILE))
    }
}
