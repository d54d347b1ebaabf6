//! Hacker News front page
//!
//! The listing is one table where every post spans three rows: the title row,
//! a metadata row (`95 points by someone 12 hours ago | hide | 71 comments`)
//! and a spacer. The table ends with two padding rows.

use super::{
    element_text, leading_integer, require, selector, title_and_link, ContentExtractor, RawPost,
    SourceId,
};
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use scraper::{ElementRef, Html, Selector};

pub const HACKER_NEWS_BASE: &str = "https://news.ycombinator.com";

/// Rows after the last post that carry no content
const TRAILING_PADDING_ROWS: usize = 2;

/// Rows per post: title, metadata, spacer
const ROWS_PER_POST: usize = 3;

/// Metadata rows of regular posts carry user, age, hide, past/flag and comments
/// links. Job posts have fewer.
const ANCHORS_WITH_COMMENTS: usize = 4;

/// Ranked-list listing made of title/metadata row pairs
#[derive(Debug, Clone)]
pub struct HackerNews {
    base: String,
}

struct Selectors {
    table: Selector,
    row: Selector,
    title_link: Selector,
    score: Selector,
    anchor: Selector,
    age: Selector,
}

impl HackerNews {
    pub fn new() -> Self {
        Self::with_base(HACKER_NEWS_BASE)
    }

    /// Use a different root, e.g. a mirror or a local test server
    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn selectors(&self) -> Result<Selectors> {
        let src = self.source_id();
        Ok(Selectors {
            table: selector(src, "table.itemlist")?,
            row: selector(src, "tr")?,
            title_link: selector(src, "a.titlelink")?,
            score: selector(src, "span.score")?,
            anchor: selector(src, "a")?,
            age: selector(src, "span.age")?,
        })
    }

    fn convert_item(
        &self,
        sel: &Selectors,
        main_line: ElementRef<'_>,
        metadata: ElementRef<'_>,
    ) -> Result<RawPost> {
        let src = self.source_id();

        let anchor = require(src, main_line, &sel.title_link, "title link `a.titlelink`")?;
        let (title, link) = title_and_link(src, &self.base, anchor)?;

        Ok(RawPost {
            title,
            link,
            upvotes: self.upvotes(sel, metadata)?,
            comments: self.comment_count(sel, metadata)?,
            published: self.published(sel, metadata)?,
        })
    }

    /// Score text ~= "415 points"; job posts have no score at all
    fn upvotes(&self, sel: &Selectors, metadata: ElementRef<'_>) -> Result<u32> {
        match metadata.select(&sel.score).next() {
            Some(score) => leading_integer(self.source_id(), &element_text(score), ' '),
            None => Ok(0),
        }
    }

    /// Last anchor text ~= "289\u{a0}comments", or "discuss" before the first one
    fn comment_count(&self, sel: &Selectors, metadata: ElementRef<'_>) -> Result<u32> {
        let links: Vec<ElementRef<'_>> = metadata.select(&sel.anchor).collect();
        if links.len() != ANCHORS_WITH_COMMENTS {
            return Ok(0);
        }

        let text = element_text(links[links.len() - 1]);
        if text.eq_ignore_ascii_case("discuss") {
            return Ok(0);
        }
        leading_integer(self.source_id(), &text, '\u{a0}')
    }

    /// Age tooltip ~= "2022-04-27T09:28:57", newer pages append a unix timestamp
    fn published(&self, sel: &Selectors, metadata: ElementRef<'_>) -> Result<Option<DateTime<Utc>>> {
        let age = require(self.source_id(), metadata, &sel.age, "age element `span.age`")?;
        let raw = age
            .value()
            .attr("title")
            .ok_or_else(|| Error::extraction(self.source_id(), "age element has no title"))?;

        parse_age_title(raw)
            .map(Some)
            .ok_or_else(|| Error::extraction(self.source_id(), format!("bad age title {:?}", raw)))
    }
}

fn parse_age_title(raw: &str) -> Option<DateTime<Utc>> {
    let token = raw.split_whitespace().next()?;
    if let Ok(naive) = NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(token)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl Default for HackerNews {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for HackerNews {
    fn source_id(&self) -> SourceId {
        SourceId::HackerNewsNews
    }

    fn base_location(&self) -> &str {
        &self.base
    }

    fn extract(&self, page: &Html) -> Result<Vec<RawPost>> {
        let sel = self.selectors()?;

        let table = page.select(&sel.table).next().ok_or_else(|| {
            Error::extraction(self.source_id(), "missing listing table `table.itemlist`")
        })?;
        let rows: Vec<ElementRef<'_>> = table.select(&sel.row).collect();

        let content_rows = rows.len().saturating_sub(TRAILING_PADDING_ROWS);
        let mut entries = Vec::with_capacity(content_rows / ROWS_PER_POST + 1);
        let mut i = 0;
        while i < content_rows {
            entries.push(self.convert_item(&sel, rows[i], rows[i + 1])?);
            i += ROWS_PER_POST;
        }

        Ok(entries)
    }
}
