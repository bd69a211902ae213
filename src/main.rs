//! # Post Scraper
//!
//! Collects post metadata (title, body text, author, publish time, and clap
//! count) from a blogging platform's public pages and stores one batch
//! document per run.
//!
//! ## Usage
//!
//! ```sh
//! post_scraper --start-date 2018-07-06
//! post_scraper -c scraper.yaml --sink file -o posts.json
//! ```
//!
//! ## Architecture
//!
//! The run is a sequential pipeline:
//! 1. **Discovery**: post URLs from daily sitemaps or a navigation crawl
//! 2. **Fetching**: each post page is downloaded; failures are skipped
//! 3. **Extraction**: five independent field extractors per page
//! 4. **Output**: the finalized batch goes to MongoDB or a JSON file

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod discovery;
mod error;
mod extract;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod utils;

use cli::Cli;
use config::{ScraperConfig, SinkKind};
use fetch::Fetcher;
use outputs::Sink;
use utils::ensure_writable_parent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("post_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = ScraperConfig::load(args.config.as_deref())?;
    config.apply_cli(&args);
    config.validate()?;
    info!(
        strategy = ?config.strategy,
        sink = ?config.sink.kind,
        scraper = %config.scraper_name,
        "Loaded configuration"
    );

    // Early check so a bad output path fails before the crawl, not after it
    if config.sink.kind == SinkKind::File {
        if let Err(e) = ensure_writable_parent(&config.sink.path).await {
            error!(path = %config.sink.path, error = %e, "Output path is not writable");
            return Err(e.into());
        }
    }

    let sink = Sink::from_config(&config.sink)?;
    let fetcher = Fetcher::new()?;

    let batch = match pipeline::run(&fetcher, &config, &sink).await {
        Ok(batch) => batch,
        Err(e) => {
            error!(error = %e, "Scrape run failed");
            return Err(e);
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        posts = batch.len(),
        "Execution complete"
    );

    Ok(())
}
