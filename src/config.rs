//! Run configuration: YAML file plus command-line overrides.
//!
//! Every setting has a default, so the scraper runs with no config file at
//! all (sitemap strategy from 2018-07-06 into the local MongoDB). A YAML file
//! passed with `--config` may set any subset of fields:
//!
//! ```yaml
//! scraper_name: medium-scraper
//! strategy: crawl
//! crawl:
//!   entry_url: https://medium.com/topics
//!   nav: { tag: li, class: nav-item }
//!   post_link: { attr: data-post-id }
//!   category_failures: skip
//! sink:
//!   kind: file
//!   path: out/posts.json
//! ```

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{debug, instrument};

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::extract::ElementQuery;

/// How post URLs are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Sitemap,
    Crawl,
}

/// What to do when a category page cannot be fetched during a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFailures {
    /// Fail the whole discovery pass.
    #[default]
    Abort,
    /// Log the failure and continue with the remaining categories.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Mongo,
    File,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Prefix of the per-day sitemap paths.
    pub base_url: String,
    /// First day to scrape, `YYYY-MM-DD`.
    pub start_date: String,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            base_url: "https://medium.com/sitemap".to_string(),
            start_date: "2018-07-06".to_string(),
        }
    }
}

impl SitemapConfig {
    pub fn start_date(&self) -> Result<NaiveDate, ConfigError> {
        NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").map_err(|_| {
            ConfigError::InvalidDate {
                value: self.start_date.clone(),
            }
        })
    }
}

/// Attribute that marks an anchor on a category page as a post link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostLinkMarker {
    pub attr: String,
    /// Required attribute value; any value matches when unset.
    #[serde(default)]
    pub value: Option<String>,
}

impl Default for PostLinkMarker {
    fn default() -> Self {
        Self {
            attr: "data-post-id".to_string(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub entry_url: Option<String>,
    /// Navigation elements on the entry page; the first link of each is a category.
    pub nav: ElementQuery,
    pub post_link: PostLinkMarker,
    pub category_failures: CategoryFailures,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            entry_url: None,
            nav: ElementQuery::tag("li").with_class("nav-item"),
            post_link: PostLinkMarker::default(),
            category_failures: CategoryFailures::default(),
        }
    }
}

/// Queries used by the per-field extractors.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub title: ElementQuery,
    pub normalize_title: bool,
    pub author: ElementQuery,
    pub claps: ElementQuery,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            title: ElementQuery::tag("h1").with_class("graf--title"),
            normalize_title: true,
            author: ElementQuery::tag("a")
                .with_class("ds-link")
                .with_attr("data-action", "show-user-card"),
            claps: ElementQuery::tag("button").with_attr("data-action", "show-recommends"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// Output file for the `file` sink.
    pub path: String,
    pub mongo_uri: String,
    pub database: String,
    pub collection: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            path: "posts.json".to_string(),
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database: "hyptodata".to_string(),
            collection: "posts".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Identifier written into `scraper_metadata.scraper`.
    pub scraper_name: String,
    pub strategy: Strategy,
    pub sitemap: SitemapConfig,
    pub crawl: CrawlConfig,
    pub extraction: ExtractionConfig,
    pub sink: SinkConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            scraper_name: "medium-scraper".to_string(),
            strategy: Strategy::default(),
            sitemap: SitemapConfig::default(),
            crawl: CrawlConfig::default(),
            extraction: ExtractionConfig::default(),
            sink: SinkConfig::default(),
        }
    }
}

impl ScraperConfig {
    /// Read a YAML config file; `None` gives the defaults.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("No config file given, using defaults");
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Overlay flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(strategy) = cli.strategy {
            self.strategy = strategy;
        }
        if let Some(start_date) = &cli.start_date {
            self.sitemap.start_date = start_date.clone();
        }
        if let Some(base) = &cli.sitemap_base_url {
            self.sitemap.base_url = base.clone();
        }
        if let Some(entry_url) = &cli.entry_url {
            self.crawl.entry_url = Some(entry_url.clone());
        }
        if let Some(policy) = cli.category_failures {
            self.crawl.category_failures = policy;
        }
        if let Some(kind) = cli.sink {
            self.sink.kind = kind;
        }
        if let Some(path) = &cli.output {
            self.sink.path = path.clone();
        }
        if let Some(uri) = &cli.mongo_uri {
            self.sink.mongo_uri = uri.clone();
        }
        if let Some(name) = &cli.scraper_name {
            self.scraper_name = name.clone();
        }
    }

    /// Check settings that have no sensible default for the chosen strategy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.strategy {
            Strategy::Sitemap => self.sitemap.start_date().map(|_| ()),
            Strategy::Crawl => match self.crawl.entry_url {
                Some(_) => Ok(()),
                None => Err(ConfigError::Missing("crawl.entry_url")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults_match_medium_layout() {
        let config = ScraperConfig::default();
        assert_eq!(config.strategy, Strategy::Sitemap);
        assert_eq!(config.scraper_name, "medium-scraper");
        assert_eq!(
            config.sitemap.start_date().unwrap(),
            NaiveDate::from_ymd_opt(2018, 7, 6).unwrap()
        );
        assert_eq!(config.sink.database, "hyptodata");
        assert_eq!(config.extraction.title.class.as_deref(), Some("graf--title"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
strategy: crawl
crawl:
  entry_url: https://blog.example.com/
  nav:
    tag: div
    class: menu
    attrs:
      role: navigation
  category_failures: skip
sink:
  kind: file
  path: out/posts.json
"#;
        let config = ScraperConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.strategy, Strategy::Crawl);
        assert_eq!(config.crawl.entry_url.as_deref(), Some("https://blog.example.com/"));
        assert_eq!(config.crawl.nav.tag, "div");
        assert_eq!(config.crawl.nav.attrs.get("role").map(String::as_str), Some("navigation"));
        assert_eq!(config.crawl.category_failures, CategoryFailures::Skip);
        assert_eq!(config.crawl.post_link.attr, "data-post-id");
        assert_eq!(config.sink.kind, SinkKind::File);
        assert_eq!(config.sink.collection, "posts");
        assert!(config.extraction.normalize_title);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ScraperConfig::from_yaml("  \n").unwrap(), ScraperConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scraper_name: custom").unwrap();
        let config = ScraperConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.scraper_name, "custom");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScraperConfig::load(Some("/nonexistent/scraper.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "post_scraper",
            "--strategy",
            "crawl",
            "--entry-url",
            "https://blog.example.com/",
            "--sink",
            "file",
            "--output",
            "x.json",
            "--category-failures",
            "skip",
        ]);
        let mut config = ScraperConfig::default();
        config.apply_cli(&cli);
        assert_eq!(config.strategy, Strategy::Crawl);
        assert_eq!(config.crawl.category_failures, CategoryFailures::Skip);
        assert_eq!(config.sink.kind, SinkKind::File);
        assert_eq!(config.sink.path, "x.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_crawl_without_entry() {
        let config = ScraperConfig {
            strategy: Strategy::Crawl,
            ..ScraperConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_validate_bad_start_date() {
        let mut config = ScraperConfig::default();
        config.sitemap.start_date = "06/07/2018".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDate { .. })));
    }
}
