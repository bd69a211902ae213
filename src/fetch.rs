//! HTTP fetching for post pages and daily sitemaps.
//!
//! Every request goes through one [`Fetcher`], which carries the constant
//! browser `User-Agent` and normalizes IRIs before they hit the wire.
//!
//! # Variants
//!
//! - [`Fetcher::fetch_html`]: lenient HTML parse via [`scraper::Html`]
//! - [`Fetcher::fetch_sitemap`]: strict XML parse via `quick-xml`, returning
//!   the `<loc>` entries

use crate::error::FetchError;
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

/// Identification header sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64)";

/// Thin wrapper over a [`reqwest::Client`] configured with [`USER_AGENT`].
///
/// No timeout is set, so a stalled server blocks the run.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Fetch a page and parse it as HTML.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute page URL; non-ASCII path segments are percent-encoded
    ///
    /// # Returns
    ///
    /// The leniently parsed document. Malformed markup never fails here.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the URL cannot be encoded, the request fails,
    /// or the server answers with an error status.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_html(&self, url: &str) -> Result<Html, FetchError> {
        let body = self.get_text(url).await?;
        Ok(Html::parse_document(&body))
    }

    /// Fetch a sitemap and return the text of every `<loc>` entry.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute sitemap URL
    ///
    /// # Returns
    ///
    /// The `<loc>` values of a `<urlset>` or `<sitemapindex>` document.
    ///
    /// # Errors
    ///
    /// Same as [`Fetcher::fetch_html`], plus [`FetchError::Xml`] when the body
    /// is not well-formed XML.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_sitemap(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let body = self.get_text(url).await?;
        parse_sitemap(&body).map_err(|source| FetchError::Xml {
            url: url.to_string(),
            source,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let target = encode_iri(url)?;
        debug!(request_url = %target, "GET");

        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(target)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;
        response.text().await.map_err(http_err)
    }
}

/// Percent-encode the path of an IRI, leaving scheme, host, query, and
/// fragment as parsed.
///
/// Each segment is decoded first, so input that is already escaped comes out
/// unchanged instead of double-encoded.
///
/// Dot segments, including escaped ones such as `%2E%2E`, are resolved by the
/// URL parser before any encoding happens, as they are for every request
/// `reqwest` sends. `https://m.test/a/%2E%2E/b` therefore targets `/b`.
pub fn encode_iri(raw: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(raw).map_err(|source| FetchError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Ok(url);
    }

    let segments = url
        .path()
        .split('/')
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|decoded| urlencoding::encode(&decoded).into_owned())
                .map_err(|e| FetchError::Encoding {
                    url: raw.to_string(),
                    reason: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    url.set_path(&segments.join("/"));
    Ok(url)
}

// Accepts both `<urlset><url>` and `<sitemapindex><sitemap>` roots. Other
// elements may sit between entries (`overlapped-lists`); `<url>` locations
// come before `<sitemap>` ones in mixed documents.
#[derive(Debug, Default, Deserialize)]
struct SitemapDocument {
    #[serde(rename = "url", default)]
    urls: Vec<SitemapEntry>,
    #[serde(rename = "sitemap", default)]
    sitemaps: Vec<SitemapEntry>,
}

#[derive(Debug, Deserialize)]
struct SitemapEntry {
    loc: String,
}

/// Parse a sitemap document into its `<loc>` values.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, quick_xml::DeError> {
    let doc: SitemapDocument = quick_xml::de::from_str(xml)?;
    Ok(doc
        .urls
        .into_iter()
        .chain(doc.sitemaps)
        .map(|entry| entry.loc.trim().to_string())
        .collect())
}
