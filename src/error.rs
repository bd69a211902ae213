//! Error types for fetching, discovery, configuration, and persistence.
//!
//! Only [`DiscoverFailure`], [`ConfigError`], and [`SinkError`] ever reach
//! `main`. A [`FetchError`] is recovered where it happens: the sitemap day or
//! post URL is logged and skipped.

use thiserror::Error;

/// Failure to fetch or parse a single remote resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed at all.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A path segment could not be decoded/encoded.
    #[error("cannot encode path of '{url}': {reason}")]
    Encoding { url: String, reason: String },

    /// Transport failure or HTTP error status.
    #[error("request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Sitemap body was not well-formed XML.
    #[error("malformed sitemap '{url}': {source}")]
    Xml {
        url: String,
        #[source]
        source: quick_xml::DeError,
    },
}

/// Fatal failure of the navigation crawl.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("entry page could not be fetched: {0}")]
    EntryPage(#[source] FetchError),

    #[error("no navigation links found on entry page '{url}'")]
    NoNavigationLinks { url: String },

    #[error("category page '{url}' could not be fetched: {source}")]
    CategoryPage {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// Anything that stops discovery from producing a URL list.
#[derive(Debug, Error)]
pub enum DiscoverFailure {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid start date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Failure to persist a finished batch.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize batch: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "mongo")]
    #[error("document store error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[cfg(feature = "mongo")]
    #[error("cannot convert batch to BSON: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),

    #[cfg(not(feature = "mongo"))]
    #[error("sink '{0}' is not available in this build")]
    Unavailable(&'static str),
}
