// SPDX-License-Identifier: AGPL-3.0
// Gallery Core - Gallery controller
//
// Orchestrates the catalog source, the favorites store and the session.
// Loads and searches take a generation ticket when they start; a result is
// applied only if no newer request has started since (last response wins).

use crate::favorites::FavoritesStore;
use crate::gateway::CatalogSource;
use crate::model::{ArtworkRecord, CatalogPage, FavoriteKey, SavedArtwork};
use crate::session::{Session, SessionStatus};
use crate::types::{AppError, GallerySettings};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};

/// How a load or search ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The session now holds this many artworks
    Loaded(usize),
    /// The default load stopped early at a failing artist
    Partial {
        count: usize,
        failed_artist: String,
        error: String,
    },
    /// The request succeeded but nothing displayable came back
    NoResults,
    /// A newer request started first; this result was discarded
    Superseded,
}

/// Artworks gathered by the default load
#[derive(Debug)]
pub struct SeedLoad {
    pub artworks: Vec<ArtworkRecord>,
    /// Last image server override seen in a successful page
    pub image_base_url: Option<String>,
    /// Artist whose search failed after earlier ones succeeded
    pub interrupted: Option<(String, AppError)>,
}

/// Search each seed artist in order, keeping artworks with images, until at
/// least `threshold` are collected. The last batch is kept whole, so the
/// result may exceed `threshold`.
///
/// A failing search stops the sequence. It is an error only if no earlier
/// search succeeded.
pub async fn collect_seed_artworks(
    catalog: &dyn CatalogSource,
    artists: &[String],
    threshold: usize,
) -> Result<SeedLoad, AppError> {
    let mut load = SeedLoad {
        artworks: Vec::new(),
        image_base_url: None,
        interrupted: None,
    };
    let mut succeeded = 0usize;

    for artist in artists {
        match catalog.search(artist).await {
            Ok(page) => {
                succeeded += 1;
                if page.image_base_url.is_some() {
                    load.image_base_url = page.image_base_url.clone();
                }
                let batch = page.into_displayable();
                tracing::debug!("Seed artist '{}' gave {} artworks", artist, batch.len());
                load.artworks.extend(batch);

                if load.artworks.len() >= threshold {
                    break;
                }
            }
            Err(e) if succeeded == 0 => {
                return Err(AppError::LoadFailed {
                    artist: artist.clone(),
                    source: Box::new(e),
                });
            }
            Err(e) => {
                tracing::warn!("Default load stopped at '{}': {}", artist, e);
                load.interrupted = Some((artist.clone(), e));
                break;
            }
        }
    }

    Ok(load)
}

/// Session orchestration for a single front end
pub struct GalleryController {
    catalog: Arc<dyn CatalogSource>,
    favorites: Arc<FavoritesStore>,
    seed_artists: Vec<String>,
    seed_threshold: usize,
    page_limit: u32,
    default_image_base_url: String,
    session: Mutex<Session>,
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl GalleryController {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        favorites: Arc<FavoritesStore>,
        settings: &GallerySettings,
    ) -> Self {
        Self {
            catalog,
            favorites,
            seed_artists: settings.seed_artists.clone(),
            seed_threshold: settings.seed_threshold,
            page_limit: settings.page_limit,
            default_image_base_url: settings.image_base_url.clone(),
            session: Mutex::new(Session::new(settings.image_base_url.clone())),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        // Session updates are plain assignments, so a poisoned lock is still consistent
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a new ticket. The generation only moves under the session lock.
    fn begin_request(&self) -> u64 {
        let mut session = self.session();
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        session.set_status(SessionStatus::Loading);
        ticket
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Replace the session with the default seed artworks
    pub async fn fetch_seed_artworks(&self) -> Result<LoadOutcome, AppError> {
        let ticket = self.begin_request();
        tracing::info!("Loading default artworks");

        let mut result =
            collect_seed_artworks(self.catalog.as_ref(), &self.seed_artists, self.seed_threshold)
                .await;
        if let Ok(load) = &mut result {
            if load.image_base_url.is_none() {
                load.image_base_url = self.probe_image_base_url().await;
            }
        }

        let mut session = self.session();
        if !self.is_current(ticket) {
            tracing::debug!("Discarding stale default load");
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(load) => {
                let count = load.artworks.len();
                let base = load
                    .image_base_url
                    .unwrap_or_else(|| self.default_image_base_url.clone());
                session.replace(load.artworks, base);

                let outcome = match load.interrupted {
                    Some((failed_artist, e)) => {
                        session.set_status(SessionStatus::Partial {
                            failed_artist: failed_artist.clone(),
                            error: e.to_string(),
                        });
                        LoadOutcome::Partial {
                            count,
                            failed_artist,
                            error: e.to_string(),
                        }
                    }
                    None if count == 0 => {
                        session.set_status(SessionStatus::NoResults { query: None });
                        LoadOutcome::NoResults
                    }
                    None => {
                        session.set_status(SessionStatus::Ready);
                        LoadOutcome::Loaded(count)
                    }
                };
                tracing::info!("Default load finished with {} artworks", count);
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Default load failed: {}", e);
                session.set_status(SessionStatus::Error(format!(
                    "Failed to load artworks: {}",
                    e
                )));
                Err(e)
            }
        }
    }

    /// Ask the catalog for its image server. Only called when no successful
    /// search page of the default load already carried an override.
    async fn probe_image_base_url(&self) -> Option<String> {
        match self.catalog.fetch_page(1, 1).await {
            Ok(page) => page.image_base_url,
            Err(e) => {
                tracing::warn!("Image server probe failed, using default: {}", e);
                None
            }
        }
    }

    /// Replace the session with search results. A blank query reloads the
    /// default artworks.
    pub async fn search_artworks(&self, query: &str) -> Result<LoadOutcome, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return self.fetch_seed_artworks().await;
        }

        let ticket = self.begin_request();
        tracing::info!("Searching artworks for '{}'", query);
        let result = self.catalog.search(query).await;

        self.apply_page(ticket, result, Some(query), "Failed to search artworks")
    }

    /// Replace the session with one page of the unfiltered catalog
    pub async fn browse_page(&self, page: u32) -> Result<LoadOutcome, AppError> {
        let ticket = self.begin_request();
        tracing::info!("Browsing catalog page {}", page);
        let result = self.catalog.fetch_page(page, self.page_limit).await;

        self.apply_page(ticket, result, None, "Failed to load artworks")
    }

    fn apply_page(
        &self,
        ticket: u64,
        result: Result<CatalogPage, AppError>,
        query: Option<&str>,
        failure: &str,
    ) -> Result<LoadOutcome, AppError> {
        let mut session = self.session();
        if !self.is_current(ticket) {
            tracing::debug!("Discarding stale results for {:?}", query);
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                let base = page
                    .image_base_url
                    .clone()
                    .unwrap_or_else(|| self.default_image_base_url.clone());
                let artworks = page.into_displayable();
                let count = artworks.len();
                session.replace(artworks, base);

                if count == 0 {
                    session.set_status(SessionStatus::NoResults {
                        query: query.map(str::to_string),
                    });
                    Ok(LoadOutcome::NoResults)
                } else {
                    session.set_status(SessionStatus::Ready);
                    Ok(LoadOutcome::Loaded(count))
                }
            }
            Err(e) => {
                tracing::error!("{} ({:?}): {}", failure, query, e);
                session.set_status(SessionStatus::Error(format!("{}: {}", failure, e)));
                Err(e)
            }
        }
    }

    /// Run the default load as a task, aborting any request still in flight
    pub fn spawn_seed_load(self: &Arc<Self>) -> JoinHandle<Result<LoadOutcome, AppError>> {
        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move { controller.fetch_seed_artworks().await });
        self.track(handle.abort_handle());
        handle
    }

    /// Run a search as a task, aborting any request still in flight
    pub fn spawn_search(
        self: &Arc<Self>,
        query: String,
    ) -> JoinHandle<Result<LoadOutcome, AppError>> {
        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move { controller.search_artworks(&query).await });
        self.track(handle.abort_handle());
        handle
    }

    fn track(&self, handle: AbortHandle) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = in_flight.replace(handle) {
            previous.abort();
        }
    }

    /// Abort the running load or search and discard its result
    pub fn cancel_in_flight(&self) {
        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = previous {
            handle.abort();
        }

        let mut session = self.session();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if *session.status() == SessionStatus::Loading {
            let status = if session.artworks().is_empty() {
                SessionStatus::Idle
            } else {
                SessionStatus::Ready
            };
            session.set_status(status);
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.session().status().clone()
    }

    /// Copy of the whole session state
    pub fn snapshot(&self) -> Session {
        self.session().clone()
    }

    pub fn current_artwork(&self) -> Option<ArtworkRecord> {
        self.session().current().cloned()
    }

    pub fn current_image_url(&self) -> Option<String> {
        let session = self.session();
        session.current().and_then(|a| session.image_url_for(a))
    }

    pub fn position(&self) -> Option<(usize, usize)> {
        self.session().position()
    }

    pub fn advance(&self) -> Option<ArtworkRecord> {
        let mut session = self.session();
        session.advance()?;
        session.current().cloned()
    }

    pub fn retreat(&self) -> Option<ArtworkRecord> {
        let mut session = self.session();
        session.retreat()?;
        session.current().cloned()
    }

    pub fn set_department_filter(&self, department: Option<String>) {
        self.session().set_department_filter(department);
    }

    pub fn departments(&self) -> Vec<String> {
        self.session().departments()
    }

    pub fn favorites(&self) -> &Arc<FavoritesStore> {
        &self.favorites
    }

    pub fn is_favorite(&self, artwork: &ArtworkRecord) -> bool {
        self.favorites
            .is_saved(&artwork.title, &artwork.artist_display)
    }

    /// Save the artwork if it isn't saved, otherwise remove it.
    /// Returns whether it is saved afterwards.
    pub fn toggle_favorite(&self, artwork: &ArtworkRecord) -> Result<bool, AppError> {
        let result = if self.is_favorite(artwork) {
            self.favorites
                .remove(&artwork.title, &artwork.artist_display)
                .map(|_| false)
        } else {
            let image_url = self.session().image_url_for(artwork).unwrap_or_default();
            self.favorites.save(artwork, &image_url).map(|_| true)
        };

        if let Err(e) = &result {
            tracing::error!("Failed to update favorite '{}': {}", artwork.title, e);
        }
        result
    }

    pub fn list_favorites(&self) -> Result<Vec<SavedArtwork>, AppError> {
        self.favorites.list_all()
    }

    pub fn remove_favorite(&self, key: &FavoriteKey) -> Result<usize, AppError> {
        self.favorites.remove(&key.title, &key.artist).map_err(|e| {
            tracing::error!("Failed to remove favorite '{}': {}", key.title, e);
            e
        })
    }

    /// Delete one saved row, as picked from `list_favorites`
    pub fn remove_saved(&self, id: &str) -> Result<bool, AppError> {
        self.favorites.remove_by_id(id).map_err(|e| {
            tracing::error!("Failed to remove saved artwork {}: {}", id, e);
            e
        })
    }
}
