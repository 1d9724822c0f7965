// SPDX-License-Identifier: AGPL-3.0
// Gallery Core - Local favorites storage
//
// Favorites live in a local SQLite database. Rows are identified by the
// (title, artist) business key; `id` is a surrogate assigned at insert.
// Every mutation runs in its own transaction and bumps a revision counter
// that subscribers use to refresh their view of `list_all`.

use crate::model::{ArtworkRecord, FavoriteKey, SavedArtwork};
use crate::types::AppError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use uuid::Uuid;

const SELECT_COLUMNS: &str =
    "id, title, artist, image_url, category, date_display, artwork_type_title, saved_at";

/// SQLite-backed store of saved artworks
pub struct FavoritesStore {
    conn: Mutex<Connection>,
    revision: watch::Sender<u64>,
}

impl FavoritesStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::FileIo(format!("Failed to create data dir: {}", e)))?;
        }

        let conn = Connection::open(path)?;
        tracing::info!("Favorites database opened at {}", path.display());
        Self::with_connection(conn)
    }

    /// Transient store, used for previews and tests
    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AppError> {
        init_schema(&conn)?;
        let (revision, _) = watch::channel(0);
        Ok(Self {
            conn: Mutex::new(conn),
            revision,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::Persistence("favorites connection poisoned".to_string()))
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Receiver that changes after every committed mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Existence check by business key.
    ///
    /// Read errors are logged and reported as "not saved" so callers never
    /// block on a broken database.
    pub fn is_saved(&self, title: &str, artist: &str) -> bool {
        match self.count_matching(title, artist) {
            Ok(count) => count > 0,
            Err(e) => {
                tracing::error!("Failed to check saved artwork '{}': {}", title, e);
                false
            }
        }
    }

    fn count_matching(&self, title: &str, artist: &str) -> Result<i64, AppError> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM saved_artworks WHERE title = ?1 AND artist = ?2",
            params![title, artist],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Insert the artwork unless its (title, artist) is already saved.
    ///
    /// Returns `Ok(true)` when a row was inserted. An existing row is never
    /// refreshed from a later save.
    pub fn save(&self, artwork: &ArtworkRecord, image_url: &str) -> Result<bool, AppError> {
        let inserted = {
            let mut conn = self.lock()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing: i64 = tx.query_row(
                "SELECT COUNT(*) FROM saved_artworks WHERE title = ?1 AND artist = ?2",
                params![artwork.title, artwork.artist_display],
                |row| row.get(0),
            )?;

            if existing == 0 {
                tx.execute(
                    "INSERT INTO saved_artworks
                        (id, title, artist, image_url, category, date_display, artwork_type_title, saved_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        Uuid::new_v4().to_string(),
                        artwork.title,
                        artwork.artist_display,
                        image_url,
                        artwork.department_title,
                        artwork.date_display,
                        artwork.artwork_type_title,
                        Utc::now(),
                    ],
                )?;
            }
            tx.commit()?;
            existing == 0
        };

        if inserted {
            tracing::info!("Saved artwork '{}'", artwork.title);
            self.bump_revision();
        }
        Ok(inserted)
    }

    /// Delete every row with this business key. Returns the number removed.
    pub fn remove(&self, title: &str, artist: &str) -> Result<usize, AppError> {
        let removed = {
            let mut conn = self.lock()?;
            let tx = conn.transaction()?;
            let removed = tx.execute(
                "DELETE FROM saved_artworks WHERE title = ?1 AND artist = ?2",
                params![title, artist],
            )?;
            tx.commit()?;
            removed
        };

        if removed > 0 {
            tracing::info!("Removed {} saved row(s) for '{}'", removed, title);
            self.bump_revision();
        }
        Ok(removed)
    }

    /// Delete a single row by its surrogate id
    pub fn remove_by_id(&self, id: &str) -> Result<bool, AppError> {
        let removed = {
            let mut conn = self.lock()?;
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM saved_artworks WHERE id = ?1", params![id])?;
            tx.commit()?;
            removed
        };

        if removed > 0 {
            self.bump_revision();
        }
        Ok(removed > 0)
    }

    /// All saved artworks, ordered by title
    pub fn list_all(&self) -> Result<Vec<SavedArtwork>, AppError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM saved_artworks ORDER BY title ASC, artist ASC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map([], map_saved_artwork)?;
        let saved = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(saved)
    }

    pub fn get(&self, id: &str) -> Result<Option<SavedArtwork>, AppError> {
        let conn = self.lock()?;
        let saved = conn
            .query_row(
                &format!("SELECT {} FROM saved_artworks WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                map_saved_artwork,
            )
            .optional()?;
        Ok(saved)
    }

    pub fn count(&self) -> Result<usize, AppError> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM saved_artworks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Look up the row for a business key
    pub fn find(&self, key: &FavoriteKey) -> Result<Option<SavedArtwork>, AppError> {
        let conn = self.lock()?;
        let saved = conn
            .query_row(
                &format!(
                    "SELECT {} FROM saved_artworks WHERE title = ?1 AND artist = ?2 LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![key.title, key.artist],
                map_saved_artwork,
            )
            .optional()?;
        Ok(saved)
    }
}

/// Create the table and key index if they don't exist
fn init_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS saved_artworks (
            id                  TEXT PRIMARY KEY,
            title               TEXT NOT NULL,
            artist              TEXT NOT NULL,
            image_url           TEXT NOT NULL,
            category            TEXT,
            date_display        TEXT,
            artwork_type_title  TEXT,
            saved_at            TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_saved_artworks_key
            ON saved_artworks(title, artist);",
    )?;
    Ok(())
}

fn map_saved_artwork(row: &Row<'_>) -> rusqlite::Result<SavedArtwork> {
    Ok(SavedArtwork {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        image_url: row.get(3)?,
        category: row.get(4)?,
        date_display: row.get(5)?,
        artwork_type_title: row.get(6)?,
        saved_at: row.get(7)?,
    })
}
