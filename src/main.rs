use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trawler::config::Config;
use trawler::crawler::Crawler;

#[derive(Parser)]
#[command(
    name = "trawler",
    version,
    about = "Bounded breadth-first site crawler with typed resource chunking",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a site starting from the configured seed URL
    Crawl {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Seed URL override
        #[arg(short, long)]
        seed: Option<String>,

        /// Maximum link depth override
        #[arg(long)]
        max_depth: Option<u32>,

        /// Concurrent worker count override
        #[arg(long)]
        workers: Option<usize>,

        /// Records per output chunk override
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Output directory override
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Crawl {
            config,
            seed,
            max_depth,
            workers,
            chunk_size,
            timeout,
            output_dir,
        } => {
            tracing::info!(
                config = %config.display(),
                seed = ?seed,
                "Starting crawl command"
            );
            crawl(config, seed, max_depth, workers, chunk_size, timeout, output_dir).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trawler=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("trawler=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn crawl(
    config_path: PathBuf,
    seed: Option<String>,
    max_depth: Option<u32>,
    workers: Option<usize>,
    chunk_size: Option<usize>,
    timeout: Option<u64>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else if seed.is_some() {
        Config::default()
    } else {
        anyhow::bail!(
            "config file {} not found; pass --config or --seed",
            config_path.display()
        );
    };

    if let Some(seed) = seed {
        config.crawler.seed_url = seed;
    }
    if let Some(max_depth) = max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(workers) = workers {
        config.crawler.worker_count = workers;
    }
    if let Some(chunk_size) = chunk_size {
        config.crawler.chunk_size = chunk_size;
    }
    if let Some(timeout) = timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(output_dir) = output_dir {
        config.output.dir = output_dir;
    }

    let crawler = Crawler::new(&config)?;
    let report = crawler.run().await?;

    let summary = serde_json::to_string_pretty(&report.stats)?;
    std::fs::write(config.output.dir.join("crawl_report.json"), summary)?;

    println!("Crawl completed in {}s", report.duration_secs);
    println!("  URLs processed: {}", report.stats.processed);
    println!("  Pages: {}", report.stats.pages);
    println!("  PDFs: {}", report.stats.pdfs);
    println!("  Other resources: {}", report.stats.skipped);
    println!(
        "  Failures: {} transport, {} status, {} parse",
        report.stats.transport_errors, report.stats.status_errors, report.stats.parse_failures
    );
    println!("  Results in: {}", config.output.dir.display());

    Ok(())
}
