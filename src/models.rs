//! Data models for scraped posts and the per-run batch document.
//!
//! - [`PostRecord`]: one fetched post page, every field optional
//! - [`Claps`]: the dual-typed engagement count
//! - [`Batch`]: all records from one run plus [`ScraperMetadata`]

use chrono::{Local, SecondsFormat};
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::extract;

/// Engagement count as stored in the batch.
///
/// Abbreviated counts (`"1.2K"`) are expanded to integers; everything else
/// keeps the page's original text. Downstream consumers rely on this mixed
/// representation, so it serializes untagged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Claps {
    Count(i64),
    Raw(String),
}

/// Metadata scraped from a single post page.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostRecord {
    pub url: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub datetime: Option<String>,
    pub author: Option<String>,
    pub claps: Option<Claps>,
}

impl PostRecord {
    /// Run every field extractor against `document`.
    ///
    /// The extractors are independent; each missing field becomes `None`
    /// without affecting the others.
    pub fn from_document(url: &str, document: &Html, config: &ExtractionConfig) -> Self {
        let title = extract::extract_title(document, &config.title).map(|t| {
            if config.normalize_title {
                extract::normalize_title(&t)
            } else {
                t
            }
        });

        Self {
            url: url.to_string(),
            title,
            text: Some(extract::extract_text(document)),
            datetime: extract::extract_datetime(document),
            author: extract::extract_author(document, &config.author),
            claps: extract::extract_claps(document, &config.claps),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScraperMetadata {
    pub scraper: String,
    /// Local wall-clock time the batch was finalized, ISO-8601.
    pub time: String,
}

/// Every post scraped in one run.
///
/// `scraper_metadata` is only set by [`Batch::finalize`], right before the
/// batch is handed to a sink.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Batch {
    pub posts: Vec<PostRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraper_metadata: Option<ScraperMetadata>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PostRecord) {
        self.posts.push(record);
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Stamp the batch with the scraper name and the current time.
    pub fn finalize(mut self, scraper: &str) -> Self {
        self.scraper_metadata = Some(ScraperMetadata {
            scraper: scraper.to_string(),
            time: Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claps_serialize_untagged() {
        assert_eq!(serde_json::to_value(Claps::Count(1200)).unwrap(), json!(1200));
        assert_eq!(
            serde_json::to_value(Claps::Raw("847".to_string())).unwrap(),
            json!("847")
        );
    }

    #[test]
    fn test_record_absent_fields_serialize_as_null() {
        let record = PostRecord {
            url: "https://medium.com/p/1".to_string(),
            title: None,
            text: Some(String::new()),
            datetime: None,
            author: None,
            claps: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["url"], "https://medium.com/p/1");
        assert!(value["title"].is_null());
        assert!(value["claps"].is_null());
        assert_eq!(value["text"], "");
    }

    #[test]
    fn test_record_from_empty_document() {
        let doc = Html::parse_document("");
        let record = PostRecord::from_document("https://x.test/p", &doc, &ExtractionConfig::default());
        assert_eq!(record.url, "https://x.test/p");
        assert_eq!(record.title, None);
        assert_eq!(record.author, None);
        assert_eq!(record.datetime, None);
        assert_eq!(record.claps, None);
    }

    #[test]
    fn test_record_title_normalization_toggle() {
        let doc = Html::parse_document(r#"<h1 class="graf--title">ﬁne</h1>"#);
        let mut config = ExtractionConfig::default();
        let record = PostRecord::from_document("u", &doc, &config);
        assert_eq!(record.title.as_deref(), Some("fine"));

        config.normalize_title = false;
        let record = PostRecord::from_document("u", &doc, &config);
        assert_eq!(record.title.as_deref(), Some("ﬁne"));
    }

    #[test]
    fn test_batch_finalize_sets_metadata() {
        let mut batch = Batch::new();
        assert!(batch.is_empty());
        batch.push(PostRecord {
            url: "u".to_string(),
            title: None,
            text: None,
            datetime: None,
            author: None,
            claps: None,
        });
        let batch = batch.finalize("medium-scraper");
        assert_eq!(batch.len(), 1);

        let meta = batch.scraper_metadata.unwrap();
        assert_eq!(meta.scraper, "medium-scraper");
        assert!(chrono::DateTime::parse_from_rfc3339(&meta.time).is_ok());
    }

    #[test]
    fn test_batch_serialization_shape() {
        let batch = Batch::new().finalize("medium-scraper");
        let value = serde_json::to_value(&batch).unwrap();
        assert!(value["posts"].as_array().unwrap().is_empty());
        assert_eq!(value["scraper_metadata"]["scraper"], "medium-scraper");
    }
}
