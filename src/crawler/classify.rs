//! Resource type classification by URL extension patterns

use regex::Regex;

use crate::models::ResourceKind;

/// Maps a URL to its resource category via an ordered pattern table.
///
/// Extension sets are mutually exclusive by construction, so table order
/// carries no semantics; it is kept stable for deterministic behavior.
pub struct ResourceClassifier {
    table: Vec<(ResourceKind, Regex)>,
}

impl ResourceClassifier {
    #[must_use]
    pub fn new() -> Self {
        let table = vec![
            (ResourceKind::Pdf, Regex::new(r"\.pdf").unwrap()),
            (
                ResourceKind::Image,
                Regex::new(r"\.(jpg|jpeg|png|gif|bmp|svg|webp)").unwrap(),
            ),
            (
                ResourceKind::Audio,
                Regex::new(r"\.(mp3|wav|ogg|flac|aac)").unwrap(),
            ),
            (
                ResourceKind::Video,
                Regex::new(r"\.(mp4|avi|mov|wmv|flv|mkv|webm)").unwrap(),
            ),
            (
                ResourceKind::Archive,
                Regex::new(r"\.(zip|rar|7z|tar|gz|bz2)").unwrap(),
            ),
        ];

        Self { table }
    }

    /// Classify a URL. Matching is case-insensitive; URLs matching no
    /// pattern are assumed to be HTML pages.
    pub fn classify(&self, url: &str) -> ResourceKind {
        let lowered = url.to_lowercase();

        for (kind, pattern) in &self.table {
            if pattern.is_match(&lowered) {
                return *kind;
            }
        }

        ResourceKind::Page
    }
}

impl Default for ResourceClassifier {
    fn default() -> Self {
        Self::new()
    }
}
