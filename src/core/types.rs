//! Shared types used across archiver modules
//!
//! Contains item locators, per-item outcomes and the typed results of page probes.

use serde::{Deserialize, Serialize};
use url::Url;

/// Normalized address of a single library item.
///
/// Built from a live page URL with the account-index segment (`/u/<n>`)
/// removed, so the same item compares equal regardless of which signed-in
/// account slot the browser happened to route through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator(String);

impl Locator {
    /// Normalize a raw page URL into a locator
    pub fn from_url(raw: &str) -> Self {
        Self(normalize(raw))
    }

    /// Get the locator as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the locator lives under the given address prefix
    pub fn has_prefix(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip the first `/u/<digits>` account-index segment from a URL.
///
/// Anything that is not a parseable URL is handled as a plain path string.
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(mut url) = Url::parse(raw) {
        if url.cannot_be_a_base() {
            return raw.to_string();
        }
        let path = strip_account_segment(url.path());
        url.set_path(&path);
        return url.to_string();
    }

    strip_account_segment(raw)
}

fn strip_account_segment(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();

    let hit = segments.windows(2).position(|pair| {
        pair[0] == "u" && !pair[1].is_empty() && pair[1].bytes().all(|b| b.is_ascii_digit())
    });

    match hit {
        Some(idx) => {
            let mut kept = segments;
            kept.drain(idx..idx + 2);
            let joined = kept.join("/");
            if joined.is_empty() {
                "/".to_string()
            } else {
                joined
            }
        }
        None => path.to_string(),
    }
}

/// Result of processing one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The archive chord was issued
    Archived,
    /// Left in place (album member, ambiguous panel, or dry run)
    Skipped,
    /// A bounded wait ran out or the page misbehaved
    Timeout,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Archived => write!(f, "archived"),
            Outcome::Skipped => write!(f, "skipped"),
            Outcome::Timeout => write!(f, "timeout"),
        }
    }
}

/// What the info panel says about album membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumState {
    /// Exactly one info region, no album marker
    NotInAlbum,
    /// Exactly one info region carrying an album marker
    InAlbum,
    /// Zero or several visible info regions
    Ambiguous { regions: usize },
}

impl AlbumState {
    /// Build the state from a visible-region count and marker flag
    pub fn from_probe(regions: usize, has_marker: bool) -> Self {
        match (regions, has_marker) {
            (1, true) => AlbumState::InAlbum,
            (1, false) => AlbumState::NotInAlbum,
            (n, _) => AlbumState::Ambiguous { regions: n },
        }
    }
}

/// Why the walk stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEnd {
    /// Reached the most recent item
    BoundaryReached,
    /// Landed on the library grid and reloading the checkpoint did not help
    StuckOnHomePage,
    /// Processed the requested number of items
    ItemLimit(usize),
    /// Operator asked to stop
    Interrupted,
    /// The page URL could not be read this many times in a row
    PageUnreadable(u32),
}

impl std::fmt::Display for WalkEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkEnd::BoundaryReached => write!(f, "reached the most recent item"),
            WalkEnd::StuckOnHomePage => write!(f, "stuck on the library home page"),
            WalkEnd::ItemLimit(n) => write!(f, "processed the item limit ({})", n),
            WalkEnd::Interrupted => write!(f, "interrupted"),
            WalkEnd::PageUnreadable(n) => write!(f, "page URL unreadable {} times in a row", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_account_index() {
        assert_eq!(
            normalize("https://photos.google.com/u/1/photo/AF1Qip"),
            "https://photos.google.com/photo/AF1Qip"
        );
    }

    #[test]
    fn test_normalize_strips_only_one_segment() {
        assert_eq!(
            normalize("https://photos.google.com/u/1/u/2/photo/x"),
            "https://photos.google.com/u/2/photo/x"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "https://photos.google.com/u/0/photo/abc?q=1",
            "https://photos.google.com/photo/abc",
            "https://photos.google.com/",
            "/u/3/photo/abc",
            "not a url",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input: {}", raw);
        }
    }

    #[test]
    fn test_normalize_keeps_non_numeric_u() {
        assert_eq!(
            normalize("https://service/u/me/photo/1"),
            "https://service/u/me/photo/1"
        );
    }

    #[test]
    fn test_normalize_plain_path() {
        assert_eq!(normalize("/u/2/photo/abc"), "/photo/abc");
        assert_eq!(normalize("/u/2"), "/");
    }

    #[test]
    fn test_locator_equivalence() {
        let a = Locator::from_url("https://photos.google.com/u/0/photo/abc");
        let b = Locator::from_url("https://photos.google.com/photo/abc");
        assert_eq!(a, b);
        assert!(a.has_prefix("https://photos.google.com/photo/"));
        assert!(!a.has_prefix(""));
    }

    #[test]
    fn test_album_state_from_probe() {
        assert_eq!(AlbumState::from_probe(1, true), AlbumState::InAlbum);
        assert_eq!(AlbumState::from_probe(1, false), AlbumState::NotInAlbum);
        assert_eq!(
            AlbumState::from_probe(0, false),
            AlbumState::Ambiguous { regions: 0 }
        );
        assert_eq!(
            AlbumState::from_probe(2, true),
            AlbumState::Ambiguous { regions: 2 }
        );
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Archived.to_string(), "archived");
        assert_eq!(Outcome::Timeout.to_string(), "timeout");
    }
}
