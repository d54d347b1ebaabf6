//! Indie Hackers popular posts feed

use super::{
    element_text, leading_integer, require, selector, title_and_link, ContentExtractor, RawPost,
    SourceId,
};
use crate::error::{Error, Result};
use scraper::{ElementRef, Html, Selector};

pub const INDIE_HACKERS_BASE: &str = "https://www.indiehackers.com";

/// Forum-style listing: a posts container holding one item per post
#[derive(Debug, Clone)]
pub struct IndieHackers {
    base: String,
}

struct Selectors {
    container: Selector,
    item: Selector,
    title_link: Selector,
    likes: Selector,
    replies: Selector,
}

impl IndieHackers {
    pub fn new() -> Self {
        Self::with_base(INDIE_HACKERS_BASE)
    }

    /// Use a different root, e.g. a mirror or a local test server
    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn selectors(&self) -> Result<Selectors> {
        let src = self.source_id();
        Ok(Selectors {
            container: selector(src, "div.posts-section__posts")?,
            item: selector(src, ".feed-item--post")?,
            title_link: selector(src, "a.feed-item__title-link")?,
            likes: selector(src, "span.feed-item__likes-count")?,
            replies: selector(src, "span.reply-count__full-count")?,
        })
    }

    fn convert_item(&self, sel: &Selectors, item: ElementRef<'_>) -> Result<RawPost> {
        let src = self.source_id();

        let anchor = require(src, item, &sel.title_link, "title link `a.feed-item__title-link`")?;
        let (title, link) = title_and_link(src, &self.base, anchor)?;

        let likes = require(src, item, &sel.likes, "like count `span.feed-item__likes-count`")?;
        let upvotes = leading_integer(src, &element_text(likes), ' ')?;

        // Expected text ~= "18 comments"
        let replies = require(src, item, &sel.replies, "reply count `span.reply-count__full-count`")?;
        let comments = leading_integer(src, &element_text(replies), ' ')?;

        Ok(RawPost {
            title,
            link,
            upvotes,
            comments,
            published: None,
        })
    }
}

impl Default for IndieHackers {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for IndieHackers {
    fn source_id(&self) -> SourceId {
        SourceId::IndieHackersPopular
    }

    fn base_location(&self) -> &str {
        &self.base
    }

    fn extract(&self, page: &Html) -> Result<Vec<RawPost>> {
        let sel = self.selectors()?;

        let container = page.select(&sel.container).next().ok_or_else(|| {
            Error::extraction(self.source_id(), "missing posts container `div.posts-section__posts`")
        })?;

        container
            .select(&sel.item)
            .map(|item| self.convert_item(&sel, item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_item(href: &str, title: &str, likes: &str, replies: &str) -> String {
        format!(
            r#"<div class="feed-item feed-item--post">
                 <a class="feed-item__title-link" href="{href}"> {title} </a>
                 <span class="feed-item__likes-count">{likes}</span>
                 <span class="reply-count"><span class="reply-count__full-count">{replies}</span></span>
               </div>"#
        )
    }

    fn page(items: &[String]) -> Html {
        Html::parse_document(&format!(
            r#"<html><body>
                 <div class="posts-section__posts">{}</div>
               </body></html>"#,
            items.concat()
        ))
    }

    #[test]
    fn test_extracts_posts_with_prefixed_links() {
        let doc = page(&[
            post_item("/post/42", "How I hit $10k MRR", "37", "18 comments"),
            post_item("/post/43", "Launching on a budget", "5", "1 comments"),
        ]);

        let posts = IndieHackers::with_base("https://example.com")
            .extract(&doc)
            .unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "How I hit $10k MRR");
        assert_eq!(posts[0].link, "https://example.com/post/42");
        assert_eq!(posts[0].upvotes, 37);
        assert_eq!(posts[0].comments, 18);
        assert_eq!(posts[0].published, None);
        assert_eq!(posts[1].comments, 1);
    }

    #[test]
    fn test_items_outside_container_are_ignored() {
        let doc = Html::parse_document(&format!(
            r#"<html><body>
                 {}
                 <div class="posts-section__posts">{}</div>
               </body></html>"#,
            post_item("/post/1", "Sidebar", "1", "0 comments"),
            post_item("/post/2", "Listed", "2", "3 comments"),
        ));

        let posts = IndieHackers::new().extract(&doc).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].link, "https://www.indiehackers.com/post/2");
    }

    #[test]
    fn test_missing_container_is_an_error() {
        let doc = Html::parse_document("<html><body><div class=\"feed\"></div></body></html>");
        let err = IndieHackers::new().extract(&doc).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_missing_title_link_is_an_error() {
        let item = r#"<div class="feed-item--post">
                        <span class="feed-item__likes-count">3</span>
                        <span class="reply-count__full-count">2 comments</span>
                      </div>"#
            .to_string();
        let err = IndieHackers::new().extract(&page(&[item])).unwrap_err();
        assert!(err.to_string().contains("feed-item__title-link"));
    }

    #[test]
    fn test_non_numeric_like_count_is_an_error() {
        let doc = page(&[post_item("/post/9", "Title", "lots", "2 comments")]);
        assert!(IndieHackers::new().extract(&doc).is_err());
    }

    #[test]
    fn test_empty_container_yields_no_posts() {
        let posts = IndieHackers::new().extract(&page(&[])).unwrap();
        assert!(posts.is_empty());
    }
}
