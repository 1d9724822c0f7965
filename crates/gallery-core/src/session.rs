// SPDX-License-Identifier: AGPL-3.0
// Gallery Core - Session list and navigation
//
// The session owns the artworks currently being browsed. Department
// filtering is a view over that list; the cursor indexes the filtered view
// and is reset to 0 whenever the list or the filter changes.

use crate::gateway::resolve_image_url;
use crate::model::ArtworkRecord;

/// What the front end should show besides the artwork itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready,
    /// The default load stopped at a failing artist after earlier ones succeeded
    Partial { failed_artist: String, error: String },
    /// A successful request that matched nothing
    NoResults { query: Option<String> },
    Error(String),
}

impl SessionStatus {
    /// User-facing message, if the status carries one
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Idle | Self::Loading | Self::Ready => None,
            Self::Partial { failed_artist, .. } => Some(format!(
                "Some artworks could not be loaded (stopped at '{}')",
                failed_artist
            )),
            Self::NoResults { query: Some(query) } => {
                Some(format!("No artworks found for '{}'", query))
            }
            Self::NoResults { query: None } => Some("No artworks found".to_string()),
            Self::Error(message) => Some(message.clone()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// In-memory browsing state
#[derive(Debug, Clone)]
pub struct Session {
    artworks: Vec<ArtworkRecord>,
    department: Option<String>,
    cursor: usize,
    image_base_url: String,
    status: SessionStatus,
}

impl Session {
    pub fn new(image_base_url: impl Into<String>) -> Self {
        Self {
            artworks: Vec::new(),
            department: None,
            cursor: 0,
            image_base_url: image_base_url.into(),
            status: SessionStatus::Idle,
        }
    }

    /// Replace the session list wholesale
    pub fn replace(&mut self, artworks: Vec<ArtworkRecord>, image_base_url: String) {
        self.artworks = artworks;
        self.image_base_url = image_base_url;
        self.cursor = 0;
    }

    pub fn artworks(&self) -> &[ArtworkRecord] {
        &self.artworks
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }

    pub fn image_base_url(&self) -> &str {
        &self.image_base_url
    }

    pub fn department_filter(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Change the department filter. Always resets the cursor.
    pub fn set_department_filter(&mut self, department: Option<String>) {
        self.department = department;
        self.cursor = 0;
    }

    /// The session list as seen through the department filter
    pub fn filtered(&self) -> Vec<&ArtworkRecord> {
        match self.department.as_deref() {
            None => self.artworks.iter().collect(),
            Some(dept) => self
                .artworks
                .iter()
                .filter(|a| a.department_title.as_deref() == Some(dept))
                .collect(),
        }
    }

    pub fn filtered_len(&self) -> usize {
        match self.department.as_deref() {
            None => self.artworks.len(),
            Some(_) => self.filtered().len(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&ArtworkRecord> {
        self.filtered().get(self.cursor).copied()
    }

    /// 1-based position and total, e.g. (3, 12) for "3 of 12"
    pub fn position(&self) -> Option<(usize, usize)> {
        let total = self.filtered_len();
        (total > 0 && self.cursor < total).then_some((self.cursor + 1, total))
    }

    /// Move forward, wrapping to the first artwork. None on an empty view.
    pub fn advance(&mut self) -> Option<usize> {
        let count = self.filtered_len();
        if count == 0 {
            return None;
        }
        self.cursor = (self.cursor + 1) % count;
        Some(self.cursor)
    }

    /// Move back, wrapping to the last artwork. None on an empty view.
    pub fn retreat(&mut self) -> Option<usize> {
        let count = self.filtered_len();
        if count == 0 {
            return None;
        }
        self.cursor = if self.cursor == 0 {
            count - 1
        } else {
            self.cursor - 1
        };
        Some(self.cursor)
    }

    /// Distinct department titles in the session list, sorted
    pub fn departments(&self) -> Vec<String> {
        let mut departments: Vec<String> = self
            .artworks
            .iter()
            .filter_map(|a| a.department_title.clone())
            .collect();
        departments.sort();
        departments.dedup();
        departments
    }

    /// Image URL for a record under the session's current base URL
    pub fn image_url_for(&self, artwork: &ArtworkRecord) -> Option<String> {
        resolve_image_url(artwork, &self.image_base_url)
    }
}
