//! Crawl orchestration: frontier scheduling and concurrent dispatch
//!
//! The scheduler drives a breadth-first-leaning traversal from the seed
//! URL. Each loop iteration drains up to `worker_count` tasks from the
//! front of the FIFO frontier, dispatches them onto the runtime, waits for
//! the whole batch to settle, and appends the children the batch emitted.
//! Batches never pipeline, so the frontier is only ever mutated by this
//! single loop and needs no synchronization of its own.
//!
//! ```text
//! ┌──────────┐ batch  ┌────────────────────┐ records ┌────────────┐
//! │ Frontier │───────▶│ Fetch-and-Process  │────────▶│ ChunkSinks │
//! │  (FIFO)  │◀───────│  tasks (spawned)   │         │ page / pdf │
//! └──────────┘ children└───────┬────────────┘         └────────────┘
//!                             │ try_mark (at-most-once)
//!                       ┌─────▼─────────┐
//!                       │ VisitedRegistry│
//!                       └───────────────┘
//! ```
//!
//! Depth never exceeds `max_depth`: link extraction is skipped once a page
//! sits at the limit, and every child is exactly one level deeper than its
//! parent. The frontier itself can grow without bound between batches when
//! fan-out outruns the drain rate; no backpressure is applied.

pub mod classify;
pub mod fetcher;
pub mod filter;
pub mod registry;
pub mod stats;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::config::Config;
use crate::error::{Error, FetchError, Result};
use crate::models::{CrawlTask, ResourceKind, ResourceRecord};
use crate::parser::PageParser;
use crate::storage::ChunkSink;

use classify::ResourceClassifier;
use fetcher::PageFetcher;
use filter::UrlFilter;
use registry::VisitedRegistry;
use stats::{CrawlStats, StatsSnapshot};

/// Final report of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Outcome counters
    pub stats: StatsSnapshot,

    /// Distinct URLs claimed over the crawl's lifetime
    pub visited: usize,

    /// Wall-clock duration in seconds
    pub duration_secs: u64,
}

/// Crawl engine
///
/// All shared collaborators live behind `Arc`, so cloning the crawler is
/// cheap; each spawned task receives its own clone.
#[derive(Clone)]
pub struct Crawler {
    seed_url: String,
    max_depth: u32,
    worker_count: usize,
    fetcher: Arc<PageFetcher>,
    parser: Arc<PageParser>,
    filter: Arc<UrlFilter>,
    classifier: Arc<ResourceClassifier>,
    visited: Arc<VisitedRegistry>,
    pages: Arc<ChunkSink>,
    pdfs: Arc<ChunkSink>,
    stats: Arc<CrawlStats>,
}

impl Crawler {
    /// Create a new crawler instance from validated configuration
    pub fn new(config: &Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;

        let fetcher = PageFetcher::new(config.request_timeout())?;

        let filter = UrlFilter::new(
            config.effective_domains(),
            &config.crawler.exclude_patterns,
            config.crawler.include_keys.clone(),
        )
        .map_err(|e| Error::config(format!("invalid exclude pattern: {e}")))?;

        let chunk_size = config.crawler.chunk_size;
        let output_dir = &config.output.dir;

        Ok(Self {
            seed_url: config.crawler.seed_url.clone(),
            max_depth: config.crawler.max_depth,
            worker_count: config.crawler.worker_count,
            fetcher: Arc::new(fetcher),
            parser: Arc::new(PageParser::new()),
            filter: Arc::new(filter),
            classifier: Arc::new(ResourceClassifier::new()),
            visited: Arc::new(VisitedRegistry::new()),
            pages: Arc::new(ChunkSink::new("page", chunk_size, output_dir)?),
            pdfs: Arc::new(ChunkSink::new("pdf", chunk_size, output_dir)?),
            stats: CrawlStats::new(),
        })
    }

    /// Run the crawl to frontier exhaustion, then flush all buffers.
    pub async fn run(&self) -> Result<CrawlReport> {
        let started = Instant::now();

        let mut frontier: VecDeque<CrawlTask> = VecDeque::new();
        frontier.push_back(CrawlTask::seed(self.seed_url.clone()));

        tracing::info!(
            seed = %self.seed_url,
            max_depth = self.max_depth,
            workers = self.worker_count,
            "Starting crawl"
        );

        while !frontier.is_empty() {
            let take = self.worker_count.min(frontier.len());
            let batch: Vec<CrawlTask> = frontier
                .drain(..take)
                // Cheap pre-filter; the definitive claim happens inside the task.
                .filter(|task| !self.visited.contains(&task.url))
                .collect();

            if batch.is_empty() {
                continue;
            }

            tracing::debug!(
                batch = batch.len(),
                pending = frontier.len(),
                visited = self.visited.len(),
                "Dispatching batch"
            );

            let handles: Vec<_> = batch
                .into_iter()
                .map(|task| {
                    let crawler = self.clone();
                    tokio::spawn(async move { crawler.process_task(task).await })
                })
                .collect();

            // Synchronous barrier: the next batch starts only after every
            // task of this one has settled.
            for outcome in futures::future::join_all(handles).await {
                match outcome {
                    Ok(children) => frontier.extend(children),
                    Err(e) => {
                        tracing::error!(error = %e, "Crawl task aborted");
                        self.stats.record_transport_error();
                    }
                }
            }
        }

        // Frontier drained: flush whatever is still buffered.
        self.pages.flush_remaining()?;
        self.pdfs.flush_remaining()?;

        let report = CrawlReport {
            stats: self.stats.snapshot(),
            visited: self.visited.len(),
            duration_secs: started.elapsed().as_secs(),
        };

        tracing::info!(
            processed = report.stats.processed,
            pages = report.stats.pages,
            pdfs = report.stats.pdfs,
            failures = report.stats.failures(),
            duration_secs = report.duration_secs,
            "Crawl complete"
        );

        Ok(report)
    }

    /// Process one frontier entry and return the child tasks it discovered.
    ///
    /// Every failure is absorbed here: the URL stays claimed, a counter
    /// notes the failure kind, and the scheduler sees an empty child list.
    async fn process_task(&self, task: CrawlTask) -> Vec<CrawlTask> {
        // Claim before fetching; of concurrent claimants exactly one proceeds.
        if !self.visited.try_mark(&task.url) {
            return Vec::new();
        }
        self.stats.record_processed();

        let kind = self.classifier.classify(&task.url);

        tracing::trace!(url = %task.url, depth = task.depth, kind = %kind, "Fetching");

        let page = match self.fetcher.fetch(&task.url).await {
            Ok(page) => page,
            Err(FetchError::Status(status)) => {
                tracing::debug!(url = %task.url, status, "Dropping non-200 response");
                self.stats.record_status_error();
                return Vec::new();
            }
            Err(e) => {
                tracing::debug!(url = %task.url, error = %e, "Fetch failed");
                self.stats.record_transport_error();
                return Vec::new();
            }
        };

        match kind {
            ResourceKind::Page if page.is_html() => self.process_page(&task, &page.body),
            ResourceKind::Pdf => {
                self.append_record(&self.pdfs, ResourceRecord::pdf(&task.url, task.depth));
                self.stats.record_pdf();
                Vec::new()
            }
            _ => {
                // Binary resources and content-type mismatches are counted only.
                self.stats.record_skipped();
                Vec::new()
            }
        }
    }

    /// Record an HTML page and expand its links into child tasks.
    fn process_page(&self, task: &CrawlTask, html: &str) -> Vec<CrawlTask> {
        let content = self.parser.extract_body(html);
        if content.is_none() {
            self.stats.record_parse_failure();
        }

        self.append_record(
            &self.pages,
            ResourceRecord::page(&task.url, task.depth, content),
        );
        self.stats.record_page();

        if task.depth >= self.max_depth {
            return Vec::new();
        }

        let base = match Url::parse(&task.url) {
            Ok(base) => base,
            Err(_) => return Vec::new(),
        };

        let mut children = Vec::new();
        for href in self.parser.extract_links(html) {
            let Some(normalized) = self.filter.normalize(&href, &base) else {
                continue;
            };
            if self.filter.is_eligible(&normalized, &self.visited) {
                children.push(task.child(normalized));
            }
        }

        self.stats.record_links(children.len() as u64);
        children
    }

    /// Sink append with fail-soft I/O: a failed chunk write costs that
    /// chunk, not the crawl.
    fn append_record(&self, sink: &ChunkSink, record: ResourceRecord) {
        if let Err(e) = sink.append(record) {
            tracing::error!(error = %e, "Failed to append record to chunk sink");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.output.dir = dir.path().to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_crawler_creation() {
        let dir = TempDir::new().unwrap();
        let crawler = Crawler::new(&test_config(&dir));
        assert!(crawler.is_ok());
    }

    #[test]
    fn test_invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.crawler.worker_count = 0;
        assert!(matches!(Crawler::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_exclude_pattern_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.crawler.exclude_patterns = vec![String::from("(unclosed")];
        assert!(Crawler::new(&config).is_err());
    }
}
