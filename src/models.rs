// Core data structures for the trawler crawler

use serde::{Deserialize, Serialize};

/// One unit of frontier work: a URL and the link depth it was discovered at.
///
/// Tasks are immutable once created; children are derived with [`CrawlTask::child`]
/// so the depth invariant (child = parent + 1) holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

impl CrawlTask {
    /// Create the depth-0 task for the seed URL
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
        }
    }

    /// Create a task for a link discovered on this task's page
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: self.depth + 1,
        }
    }
}

/// Resource category assigned by URL extension pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Page,
    Pdf,
    Image,
    Audio,
    Video,
    Archive,
}

impl ResourceKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Archive => "archive",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "page" => Some(Self::Page),
            "pdf" => Some(Self::Pdf),
            "image" => Some(Self::Image),
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            "archive" => Some(Self::Archive),
            _ => None,
        }
    }

    /// Whether records of this kind are persisted to a chunk sink
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Page | Self::Pdf)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One fetched and classified result
///
/// `content` is present only for HTML pages; binary resources carry
/// location and depth alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub url: String,
    pub depth: u32,
    pub kind: ResourceKind,
    pub content: Option<String>,
}

impl ResourceRecord {
    /// Create a page record with its extracted body markup
    pub fn page(url: &str, depth: u32, content: Option<String>) -> Self {
        Self {
            url: url.to_string(),
            depth,
            kind: ResourceKind::Page,
            content,
        }
    }

    /// Create a PDF record
    pub fn pdf(url: &str, depth: u32) -> Self {
        Self {
            url: url.to_string(),
            depth,
            kind: ResourceKind::Pdf,
            content: None,
        }
    }
}
