//! Command-line interface definitions for the post scraper.
//!
//! Flags override values from the YAML config file. A few can also be
//! provided through environment variables.

use clap::Parser;

use crate::config::{CategoryFailures, SinkKind, Strategy};

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Sitemap strategy into the local MongoDB
/// post_scraper --start-date 2018-07-06
///
/// # Crawl a topics page and write JSON
/// post_scraper --strategy crawl --entry-url https://medium.com/topics \
///     --sink file --output posts.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "POST_SCRAPER_CONFIG")]
    pub config: Option<String>,

    /// Link discovery strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<Strategy>,

    /// First day of sitemaps to scrape (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Prefix of the per-day sitemap URLs
    #[arg(long)]
    pub sitemap_base_url: Option<String>,

    /// Entry page for the crawl strategy
    #[arg(short, long)]
    pub entry_url: Option<String>,

    /// Abort or skip when a category page cannot be fetched
    #[arg(long, value_enum)]
    pub category_failures: Option<CategoryFailures>,

    /// Where to store the batch
    #[arg(long, value_enum)]
    pub sink: Option<SinkKind>,

    /// Output file for the file sink
    #[arg(short, long)]
    pub output: Option<String>,

    /// MongoDB connection string
    #[arg(long, env = "MONGO_URI")]
    pub mongo_uri: Option<String>,

    /// Identifier recorded in the batch metadata
    #[arg(long)]
    pub scraper_name: Option<String>,
}
