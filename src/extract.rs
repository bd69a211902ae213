//! Field extraction from a fetched post page.
//!
//! Each extractor takes the parsed document and returns an `Option`, so a
//! missing element or attribute only blanks its own field. The queries are
//! described with [`ElementQuery`], a "tag + class + attribute set" matcher
//! that mirrors how post pages mark up their metadata.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::models::Claps;

/// Matches elements by tag name, optional class membership, and exact
/// attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ElementQuery {
    pub tag: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl ElementQuery {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            class: None,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// True if `element` satisfies every constraint of the query.
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        if !value.name().eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        if let Some(class) = &self.class
            && !value.classes().any(|c| c == class)
        {
            return false;
        }
        self.attrs
            .iter()
            .all(|(name, expected)| value.attr(name) == Some(expected.as_str()))
    }

    /// All matching elements in document order.
    ///
    /// An unparsable tag name matches nothing.
    pub fn find_all<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let Ok(selector) = Selector::parse(&self.tag) else {
            debug!(tag = %self.tag, "Unparsable tag in query");
            return Vec::new();
        };
        document
            .select(&selector)
            .filter(|el| self.matches(el))
            .collect()
    }

    pub fn find_first<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.find_all(document).into_iter().next()
    }
}

/// Concatenated text of all descendant text nodes.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of the first element matching `query` (typically `h1.graf--title`).
pub fn extract_title(document: &Html, query: &ElementQuery) -> Option<String> {
    query.find_first(document).map(|el| element_text(&el))
}

/// Unicode compatibility decomposition (NFKD).
pub fn normalize_title(title: &str) -> String {
    title.nfkd().collect()
}

/// Text of every `<p>`, joined by single spaces.
///
/// The HTML parser always produces an element tree, so a page without
/// paragraphs yields an empty string rather than `None`.
pub fn extract_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };
    document
        .select(&selector)
        .map(|p| element_text(&p))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `datetime` attribute of the first `<time>` element.
pub fn extract_datetime(document: &Html) -> Option<String> {
    let time = ElementQuery::tag("time").find_first(document);
    let datetime = time.and_then(|el| el.value().attr("datetime").map(str::to_string));
    if datetime.is_none() {
        debug!("No <time datetime> element on page");
    }
    datetime
}

/// Text of the first element matching `query`, e.g.
/// `a.ds-link[data-action="show-user-card"]`.
pub fn extract_author(document: &Html, query: &ElementQuery) -> Option<String> {
    query.find_first(document).map(|el| element_text(&el))
}

/// Engagement count from the first element matching `query`.
pub fn extract_claps(document: &Html, query: &ElementQuery) -> Option<Claps> {
    query
        .find_first(document)
        .and_then(|el| parse_claps(&element_text(&el)))
}

/// Interpret a displayed engagement count.
///
/// `"1.2K"` becomes `Claps::Count(1200)` (truncated, not rounded); anything
/// without the `K` suffix is kept verbatim as `Claps::Raw`. A `K` value whose
/// prefix is not a finite number (`lotsK`, `NaNK`, `infK`) yields `None`.
pub fn parse_claps(text: &str) -> Option<Claps> {
    match text.strip_suffix('K') {
        Some(number) => match number.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(Claps::Count((value * 1000.0) as i64)),
            Ok(value) => {
                debug!(%text, %value, "Non-finite abbreviated clap count");
                None
            }
            Err(e) => {
                debug!(%text, error = %e, "Unparsable abbreviated clap count");
                None
            }
        },
        None => Some(Claps::Raw(text.to_string())),
    }
}
