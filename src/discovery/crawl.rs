//! Discovery by crawling site navigation.
//!
//! Two hops: the entry page's navigation elements point at category pages,
//! and each category page lists post links marked with a dedicated attribute
//! (for example `data-post-id`). Relative links are resolved against the page
//! they were found on.

use itertools::Itertools;
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::{CategoryFailures, CrawlConfig, PostLinkMarker};
use crate::error::DiscoveryError;
use crate::extract::ElementQuery;
use crate::fetch::Fetcher;

/// Resolve `href` against `base`, falling back to the raw value when either
/// side does not parse.
fn resolve(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// First `a[href]` inside each navigation element matching `nav`.
pub fn navigation_links(document: &Html, page_url: &str, nav: &ElementQuery) -> Vec<String> {
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    nav.find_all(document)
        .into_iter()
        .filter_map(|el| el.select(&anchor).next())
        .filter_map(|a| a.value().attr("href"))
        .map(|href| resolve(page_url, href))
        .collect()
}

/// Every `a[href]` carrying the post-link marker.
pub fn post_links(document: &Html, page_url: &str, marker: &PostLinkMarker) -> Vec<String> {
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&anchor)
        .filter(|a| match (a.value().attr(&marker.attr), &marker.value) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        })
        .filter_map(|a| a.value().attr("href"))
        .map(|href| resolve(page_url, href))
        .collect()
}

/// Drop repeated URLs, keeping the first occurrence of each.
pub fn dedupe(links: impl IntoIterator<Item = String>) -> Vec<String> {
    links.into_iter().unique().collect()
}

/// Crawl `entry_url` and return the unique post URLs.
///
/// # Errors
///
/// - the entry page cannot be fetched
/// - the entry page has no navigation links
/// - a category page cannot be fetched and
///   [`CategoryFailures::Abort`] is configured
#[instrument(level = "info", skip(fetcher, config))]
pub async fn discover(
    fetcher: &Fetcher,
    entry_url: &str,
    config: &CrawlConfig,
) -> Result<Vec<String>, DiscoveryError> {
    let categories = {
        let entry = fetcher
            .fetch_html(entry_url)
            .await
            .map_err(DiscoveryError::EntryPage)?;
        navigation_links(&entry, entry_url, &config.nav)
    };
    if categories.is_empty() {
        error!(%entry_url, "Entry page has no navigation links");
        return Err(DiscoveryError::NoNavigationLinks {
            url: entry_url.to_string(),
        });
    }
    info!(count = categories.len(), "Found category pages");

    let mut raw_links = Vec::new();
    for category in &categories {
        match fetcher.fetch_html(category).await {
            Ok(page) => {
                let found = post_links(&page, category, &config.post_link);
                debug!(%category, count = found.len(), "Collected post links");
                raw_links.extend(found);
            }
            Err(source) => match config.category_failures {
                CategoryFailures::Abort => {
                    return Err(DiscoveryError::CategoryPage {
                        url: category.clone(),
                        source,
                    });
                }
                CategoryFailures::Skip => {
                    warn!(%category, error = %source, "Skipping category page");
                }
            },
        }
    }

    let links = dedupe(raw_links);
    info!(count = links.len(), "Discovered post URLs from navigation");
    Ok(links)
}
