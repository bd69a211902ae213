//! Post URL discovery.
//!
//! Two strategies produce the list of post pages to scrape:
//!
//! | Strategy | Module | Failure mode |
//! |----------|--------|--------------|
//! | Daily sitemaps | [`sitemap`] | per day; a missing sitemap is skipped |
//! | Navigation crawl | [`crawl`] | whole pass fails without category links |
//!
//! [`discover`] picks one according to the run configuration.

pub mod crawl;
pub mod sitemap;

use chrono::Local;
use tracing::instrument;

use crate::config::{ScraperConfig, Strategy};
use crate::error::{ConfigError, DiscoverFailure};
use crate::fetch::Fetcher;

/// Run the configured strategy. The sitemap range ends at today's local date.
///
/// # Errors
///
/// Returns [`DiscoverFailure::Config`] for an unparsable start date or a
/// crawl without an entry URL, and [`DiscoverFailure::Discovery`] when the
/// crawl itself fails. The sitemap strategy never fails once configured.
#[instrument(level = "info", skip_all, fields(strategy = ?config.strategy))]
pub async fn discover(
    fetcher: &Fetcher,
    config: &ScraperConfig,
) -> Result<Vec<String>, DiscoverFailure> {
    match config.strategy {
        Strategy::Sitemap => {
            let start = config.sitemap.start_date()?;
            let today = Local::now().date_naive();
            Ok(sitemap::discover(fetcher, &config.sitemap.base_url, start, today).await)
        }
        Strategy::Crawl => {
            let entry_url = config
                .crawl
                .entry_url
                .as_deref()
                .ok_or(ConfigError::Missing("crawl.entry_url"))?;
            Ok(crawl::discover(fetcher, entry_url, &config.crawl).await?)
        }
    }
}
