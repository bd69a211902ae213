//! The scrape run: discover, fetch, extract, accumulate, persist.
//!
//! URLs are processed strictly one after another. A post page that fails to
//! fetch is logged and dropped without a record; a page that fetches but is
//! missing every field still produces one record.

use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::{ExtractionConfig, ScraperConfig};
use crate::discovery;
use crate::fetch::Fetcher;
use crate::models::{Batch, PostRecord};
use crate::outputs::BatchSink;
use crate::utils::truncate_for_log;

/// Fetch and extract a single post page.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn scrape_post(
    fetcher: &Fetcher,
    url: &str,
    extraction: &ExtractionConfig,
) -> Option<PostRecord> {
    match fetcher.fetch_html(url).await {
        Ok(document) => {
            let record = PostRecord::from_document(url, &document, extraction);
            debug!(
                title = ?record.title,
                author = ?record.author,
                datetime = ?record.datetime,
                claps = ?record.claps,
                text = %truncate_for_log(record.text.as_deref().unwrap_or_default(), 120),
                "Scraped post"
            );
            Some(record)
        }
        Err(e) => {
            warn!(error = %e, "Error occurred, skipping URL");
            None
        }
    }
}

/// Scrape every URL in order into an unfinalized batch.
///
/// # Arguments
///
/// * `fetcher` - Shared HTTP fetcher
/// * `urls` - Post URLs in discovery order
/// * `extraction` - Queries for the field extractors
///
/// # Returns
///
/// A [`Batch`] with one record per URL that fetched successfully. Failed
/// fetches are logged and leave no record.
#[instrument(level = "info", skip_all, fields(urls = urls.len()))]
pub async fn collect_posts(
    fetcher: &Fetcher,
    urls: &[String],
    extraction: &ExtractionConfig,
) -> Batch {
    let records: Vec<PostRecord> = stream::iter(urls)
        .then(|url| scrape_post(fetcher, url, extraction))
        .filter_map(std::future::ready)
        .collect()
        .await;

    let mut batch = Batch::new();
    for record in records {
        batch.push(record);
    }
    info!(
        discovered = urls.len(),
        scraped = batch.len(),
        skipped = urls.len() - batch.len(),
        "Collected posts"
    );
    batch
}

/// Run one full scrape and hand the batch to `sink`.
///
/// # Arguments
///
/// * `fetcher` - Shared HTTP fetcher
/// * `config` - Strategy, extraction queries, and scraper name
/// * `sink` - Destination for the finalized batch, called exactly once
///
/// # Returns
///
/// The batch that was stored.
///
/// # Errors
///
/// Discovery errors end the run before any post is fetched or anything is
/// stored. A sink error is returned after the batch has been assembled.
pub async fn run<S: BatchSink>(
    fetcher: &Fetcher,
    config: &ScraperConfig,
    sink: &S,
) -> Result<Batch, Box<dyn Error>> {
    let urls = discovery::discover(fetcher, config).await?;
    let batch = collect_posts(fetcher, &urls, &config.extraction)
        .await
        .finalize(&config.scraper_name);
    if batch.is_empty() {
        warn!("No posts scraped; storing an empty batch");
    }

    sink.store(&batch).await?;
    Ok(batch)
}
