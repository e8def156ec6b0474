//! trawler - bounded breadth-first site crawler
//!
//! A single-process crawler that walks a site from a seed URL up to a
//! configured link depth, classifies every reachable resource by type,
//! guarantees at-most-once processing per URL under concurrent dispatch,
//! and persists classified records as fixed-size CSV chunks.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration loading and validation
//! - [`crawler`] - Frontier scheduling, fetching, filtering, dedup
//! - [`parser`] - HTML body and link extraction
//! - [`models`] - Core data structures and types
//! - [`storage`] - Chunked CSV output
//!
//! # Example
//!
//! ```no_run
//! use trawler::config::Config;
//! use trawler::crawler::Crawler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_file(std::path::Path::new("config.toml"))?;
//!     let crawler = Crawler::new(&config)?;
//!     let report = crawler.run().await?;
//!     println!("processed {} URLs", report.stats.processed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{CrawlReport, Crawler};
    pub use crate::error::{Error, FetchError, Result};
    pub use crate::models::{CrawlTask, ResourceKind, ResourceRecord};
    pub use crate::parser::PageParser;
    pub use crate::storage::ChunkSink;
}

// Direct re-exports for convenience
pub use crawler::{CrawlReport, Crawler};
pub use models::{CrawlTask, ResourceKind, ResourceRecord};
