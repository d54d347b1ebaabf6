//! Source-specific markup extraction
//!
//! Each supported site has one extractor that knows where its listing lives in
//! the page markup and how to read the engagement numbers out of it. Extractors
//! are pure: they take an already parsed [`Html`] document and return
//! [`RawPost`]s, leaving fetching and persistence to the caller.
//!
//! A missing structural element is always an error. Layout changes upstream
//! should fail loudly instead of producing an empty or partial listing.

mod hacker_news;
mod indie_hackers;

pub use hacker_news::*;
pub use indie_hackers::*;

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

/// Identifies a content origin (one site + category combination)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceId {
    #[serde(rename = "IndieHacker-post-popular")]
    IndieHackersPopular,
    #[serde(rename = "hackerNews-news")]
    HackerNewsNews,
}

impl SourceId {
    /// Every known source, in ingestion order
    pub const ALL: [SourceId; 2] = [SourceId::IndieHackersPopular, SourceId::HackerNewsNews];

    /// Stable identifier persisted as the location key
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::IndieHackersPopular => "IndieHacker-post-popular",
            SourceId::HackerNewsNews => "hackerNews-news",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("Unknown source: {}", s)))
    }
}

/// A post as read from the page, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    pub title: String,
    /// Absolute link to the post
    pub link: String,
    pub upvotes: u32,
    pub comments: u32,
    pub published: Option<DateTime<Utc>>,
}

/// Turns one site's page markup into raw posts
pub trait ContentExtractor: Send + Sync {
    /// Identifier of the source; never depends on fetched content
    fn source_id(&self) -> SourceId;

    /// Root URL that is fetched and used to resolve relative links
    fn base_location(&self) -> &str;

    /// Parse every post on the page
    fn extract(&self, page: &Html) -> Result<Vec<RawPost>>;
}

/// Build the extractor registered for a source
pub fn extractor_for(source: SourceId) -> Box<dyn ContentExtractor> {
    match source {
        SourceId::IndieHackersPopular => Box::new(IndieHackers::new()),
        SourceId::HackerNewsNews => Box::new(HackerNews::new()),
    }
}

/// All registered extractors, in ingestion order
pub fn registry() -> Vec<Box<dyn ContentExtractor>> {
    SourceId::ALL.into_iter().map(extractor_for).collect()
}

// ===== Shared parsing helpers =====

pub(crate) fn selector(source: SourceId, css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| Error::extraction(source, format!("invalid selector `{}`: {:?}", css, e)))
}

/// First descendant matching `sel`, or an extraction error naming `what`
pub(crate) fn require<'a>(
    source: SourceId,
    scope: ElementRef<'a>,
    sel: &Selector,
    what: &str,
) -> Result<ElementRef<'a>> {
    scope
        .select(sel)
        .next()
        .ok_or_else(|| Error::extraction(source, format!("missing {}", what)))
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse the integer before the first `delimiter` ("18 comments" -> 18)
pub(crate) fn leading_integer(source: SourceId, text: &str, delimiter: char) -> Result<u32> {
    let token = text.trim().split(delimiter).next().unwrap_or_default().trim();
    token.parse::<u32>().map_err(|_| {
        Error::extraction(source, format!("expected a leading integer in {:?}", text))
    })
}

/// Read the title text and absolute link out of a title anchor
pub(crate) fn title_and_link(
    source: SourceId,
    base: &str,
    anchor: ElementRef<'_>,
) -> Result<(String, String)> {
    let title = element_text(anchor);
    if title.is_empty() {
        return Err(Error::extraction(source, "empty post title"));
    }

    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| Error::extraction(source, format!("title anchor {:?} has no href", title)))?;

    Ok((title, resolve_link(source, base, href)?))
}

/// Resolve `href` against the source's base location
pub(crate) fn resolve_link(source: SourceId, base: &str, href: &str) -> Result<String> {
    let base = Url::parse(base)?;
    base.join(href.trim())
        .map(|u| u.to_string())
        .map_err(|e| Error::extraction(source, format!("bad link {:?}: {}", href, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_roundtrip() {
        for id in SourceId::ALL {
            assert_eq!(id.to_string().parse::<SourceId>().unwrap(), id);
        }
        assert_eq!(
            "hackernews-news".parse::<SourceId>().unwrap(),
            SourceId::HackerNewsNews
        );
        assert!("reddit-front".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_registry_order_and_ids() {
        let ids: Vec<SourceId> = registry().iter().map(|e| e.source_id()).collect();
        assert_eq!(ids, SourceId::ALL.to_vec());
    }

    #[test]
    fn test_leading_integer() {
        let src = SourceId::HackerNewsNews;
        assert_eq!(leading_integer(src, "415 points", ' ').unwrap(), 415);
        assert_eq!(leading_integer(src, " 18 comments\n", ' ').unwrap(), 18);
        assert_eq!(leading_integer(src, "71\u{a0}comments", '\u{a0}').unwrap(), 71);
        assert!(leading_integer(src, "discuss", '\u{a0}').is_err());
        assert!(leading_integer(src, "-3 points", ' ').is_err());
    }

    #[test]
    fn test_resolve_link() {
        let src = SourceId::IndieHackersPopular;
        assert_eq!(
            resolve_link(src, "https://example.com", "/post/42").unwrap(),
            "https://example.com/post/42"
        );
        assert_eq!(
            resolve_link(src, "https://news.ycombinator.com", "item?id=7").unwrap(),
            "https://news.ycombinator.com/item?id=7"
        );
        assert_eq!(
            resolve_link(src, "https://news.ycombinator.com", "https://blog.rust-lang.org/x")
                .unwrap(),
            "https://blog.rust-lang.org/x"
        );
    }
}
