// SPDX-License-Identifier: AGPL-3.0
// Gallery Term - Text rendering

use gallery_core::{ArtworkRecord, SavedArtwork, SessionStatus};

/// Multi-line card for the artwork under the cursor
pub fn artwork_card(
    artwork: &ArtworkRecord,
    position: Option<(usize, usize)>,
    image_url: Option<&str>,
    is_favorite: bool,
) -> String {
    let mut lines = Vec::new();

    let marker = if is_favorite { "♥" } else { " " };
    lines.push(format!("{} {}", marker, artwork.title));
    lines.push(format!("  {}", artwork.artist_display.replace('\n', " / ")));

    let details: Vec<&str> = [
        artwork.date_display.as_deref(),
        artwork.artwork_type_title.as_deref(),
        artwork.department_title.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !details.is_empty() {
        lines.push(format!("  {}", details.join(" | ")));
    }

    if let Some(alt) = artwork.thumbnail.as_ref().and_then(|t| t.alt_text.as_deref()) {
        lines.push(format!("  \"{}\"", alt));
    }
    if let Some(url) = image_url {
        lines.push(format!("  {}", url));
    }
    if let Some((index, total)) = position {
        lines.push(format!("  {} of {}", index, total));
    }

    lines.join("\n")
}

/// Numbered list of saved artworks
pub fn favorites_list(saved: &[SavedArtwork]) -> String {
    if saved.is_empty() {
        return "No saved artworks".to_string();
    }

    saved
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let category = s.category.as_deref().unwrap_or("Uncategorized");
            format!("{:>3}. {} - {} [{}]", i + 1, s.title, s.artist.replace('\n', " / "), category)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One status line, or None when there is nothing to say
pub fn status_line(status: &SessionStatus) -> Option<String> {
    match status {
        SessionStatus::Loading => Some("Loading...".to_string()),
        other => other.message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(titles: &[&str]) -> Vec<SavedArtwork> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| SavedArtwork {
                id: i.to_string(),
                title: title.to_string(),
                artist: "Artist\nDutch".to_string(),
                image_url: String::new(),
                category: (i == 0).then(|| "Prints".to_string()),
                date_display: None,
                artwork_type_title: None,
                saved_at: Default::default(),
            })
            .collect()
    }

    fn artwork() -> ArtworkRecord {
        ArtworkRecord {
            id: 1,
            title: "The Bedroom".to_string(),
            artist_display: "Vincent van Gogh\nDutch, 1853-1890".to_string(),
            date_display: Some("1889".to_string()),
            image_id: Some("abc".to_string()),
            thumbnail: None,
            artwork_type_title: Some("Painting".to_string()),
            department_title: None,
            artist_title: None,
        }
    }

    #[test]
    fn test_artwork_card() {
        let card = artwork_card(&artwork(), Some((2, 7)), Some("https://img/abc"), true);
        let lines: Vec<&str> = card.lines().collect();
        assert_eq!(lines[0], "♥ The Bedroom");
        assert_eq!(lines[1], "  Vincent van Gogh / Dutch, 1853-1890");
        assert_eq!(lines[2], "  1889 | Painting");
        assert_eq!(lines[3], "  https://img/abc");
        assert_eq!(lines[4], "  2 of 7");
    }

    #[test]
    fn test_favorites_list() {
        assert_eq!(favorites_list(&[]), "No saved artworks");
        let listing = favorites_list(&saved(&["Nighthawks", "Bathers"]));
        assert_eq!(
            listing,
            "  1. Nighthawks - Artist / Dutch [Prints]\n  2. Bathers - Artist / Dutch [Uncategorized]"
        );
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(&SessionStatus::Ready), None);
        assert_eq!(
            status_line(&SessionStatus::Loading).as_deref(),
            Some("Loading...")
        );
    }
}
