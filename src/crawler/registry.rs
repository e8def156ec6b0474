//! Concurrency-safe registry of visited URLs
//!
//! The registry is the single correctness-critical primitive of the crawl:
//! a URL must be claimed by exactly one worker before any fetch for it
//! begins. Claiming is therefore a test-and-set performed under one lock
//! acquisition, never a separate check followed by an insert.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Set of normalized URLs already claimed for processing.
///
/// Grows monotonically for the lifetime of a crawl; entries are never
/// removed, so a failed fetch keeps its URL claimed and is not retried.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    inner: Mutex<HashSet<String>>,
}

impl VisitedRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a URL for processing.
    ///
    /// Returns `true` iff this call was the first to mark the URL; across
    /// all concurrent callers exactly one receives `true`.
    pub fn try_mark(&self, url: &str) -> bool {
        self.lock().insert(url.to_string())
    }

    /// Read-only membership check. Used as a cheap scheduler pre-filter;
    /// it does not claim the URL.
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
