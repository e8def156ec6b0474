//! Aggregate crawl outcome counters
//!
//! Task failures never propagate past the task boundary; these counters
//! are the only externally visible trace of them. All counters are atomic
//! and shared by every worker.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Thread-safe crawl counters
#[derive(Debug, Default)]
pub struct CrawlStats {
    /// Tasks that successfully claimed their URL
    processed: AtomicU64,

    /// Page records persisted
    pages: AtomicU64,

    /// PDF records persisted
    pdfs: AtomicU64,

    /// Resources counted but not persisted (binary kinds, content-type mismatch)
    skipped: AtomicU64,

    /// Timeouts, connection and decode failures
    transport_errors: AtomicU64,

    /// Responses with a status other than 200
    status_errors: AtomicU64,

    /// Pages whose body markup could not be extracted
    parse_failures: AtomicU64,

    /// Child tasks emitted into the frontier
    links_emitted: AtomicU64,
}

impl CrawlStats {
    /// Create new shared stats counter
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page(&self) {
        self.pages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pdf(&self) {
        self.pdfs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_status_error(&self) {
        self.status_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_links(&self, count: u64) {
        self.links_emitted.fetch_add(count, Ordering::Relaxed);
    }

    /// Get snapshot of current counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            pages: self.pages.load(Ordering::Relaxed),
            pdfs: self.pdfs.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            status_errors: self.status_errors.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            links_emitted: self.links_emitted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the crawl counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    pub processed: u64,
    pub pages: u64,
    pub pdfs: u64,
    pub skipped: u64,
    pub transport_errors: u64,
    pub status_errors: u64,
    pub parse_failures: u64,
    pub links_emitted: u64,
}

impl StatsSnapshot {
    /// Total fetches that produced no record
    pub fn failures(&self) -> u64 {
        self.transport_errors + self.status_errors
    }

    /// Fraction of processed tasks that produced a record or a counted skip
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 1.0;
        }
        (self.processed - self.failures()) as f64 / self.processed as f64
    }
}
