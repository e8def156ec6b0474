//! Configuration management for the trawler crawler
//!
//! This module handles loading and validating configuration from a TOML
//! file and command-line overrides. Every option is explicit and carries a
//! default; validation runs once at startup and is the only place a crawl
//! can fail before it starts.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL the crawl starts from (depth 0)
    pub seed_url: String,

    /// Maximum link depth to follow
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of records per output chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Number of concurrent fetch workers per batch
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Substrings a URL must contain to be enqueued (empty = no restriction)
    #[serde(default)]
    pub include_keys: Vec<String>,

    /// Hosts (and their subdomains) the crawl may visit.
    /// Empty means the seed URL's host only.
    #[serde(default)]
    pub allowed_domains: Vec<String>,

    /// Regex patterns that disqualify a URL, checked in order.
    /// Exclusion always takes precedence over `include_keys`.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory chunk files are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_max_depth() -> u32 {
    3
}

fn default_chunk_size() -> usize {
    100
}

fn default_worker_count() -> usize {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("text")
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let seed = Url::parse(&self.crawler.seed_url)
            .with_context(|| format!("seed_url is not a valid URL: {}", self.crawler.seed_url))?;

        if seed.scheme() != "http" && seed.scheme() != "https" {
            anyhow::bail!("seed_url must use http or https: {}", self.crawler.seed_url);
        }

        if seed.host_str().is_none() {
            anyhow::bail!("seed_url has no host: {}", self.crawler.seed_url);
        }

        if self.crawler.worker_count == 0 {
            anyhow::bail!("worker_count must be greater than 0");
        }

        if self.crawler.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than 0");
        }

        for pattern in &self.crawler.exclude_patterns {
            Regex::new(pattern)
                .with_context(|| format!("invalid exclude pattern: {pattern}"))?;
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    /// Domains the crawl is allowed to visit.
    ///
    /// Falls back to the seed URL's host when none are configured.
    #[must_use]
    pub fn effective_domains(&self) -> Vec<String> {
        if !self.crawler.allowed_domains.is_empty() {
            return self.crawler.allowed_domains.clone();
        }

        Url::parse(&self.crawler.seed_url)
            .ok()
            .and_then(|seed| seed.host_str().map(str::to_owned))
            .map(|host| vec![host])
            .unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig {
                seed_url: String::from("https://example.com/"),
                max_depth: default_max_depth(),
                chunk_size: default_chunk_size(),
                worker_count: default_worker_count(),
                request_timeout_secs: default_request_timeout_secs(),
                include_keys: Vec::new(),
                allowed_domains: Vec::new(),
                exclude_patterns: Vec::new(),
            },
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
