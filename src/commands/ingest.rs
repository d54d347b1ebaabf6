//! Ingest command implementation
//!
//! For each source: fetch the page, extract every post, normalize, then save
//! the whole batch. Extraction finishes before anything is written, so a
//! source that fails leaves no partial records behind.

use crate::config::Config;
use crate::content::{normalize, InternetContent};
use crate::error::Result;
use crate::extract::{extractor_for, ContentExtractor, SourceId};
use crate::fetch::Fetcher;
use crate::progress::source_progress_bar;
use crate::store::{ContentStore, SaveStats};
use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Outcome of ingesting one source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: SourceId,
    pub posts_extracted: usize,
    pub saved: SaveStats,
    /// Set when the source failed; nothing was saved for it
    pub error: Option<String>,
}

/// Statistics from an ingestion run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    pub sources: Vec<SourceReport>,
}

impl IngestStats {
    pub fn failures(&self) -> usize {
        self.sources.iter().filter(|r| r.error.is_some()).count()
    }

    pub fn contents_created(&self) -> usize {
        self.sources.iter().map(|r| r.saved.contents_created).sum()
    }
}

/// Extractors for the requested sources, or the configured ones
pub fn select_extractors(
    config: &Config,
    requested: Option<&[SourceId]>,
) -> Result<Vec<Box<dyn ContentExtractor>>> {
    let sources = match requested {
        Some(ids) => ids.to_vec(),
        None => config.enabled_sources()?,
    };
    Ok(sources.into_iter().map(extractor_for).collect())
}

/// Parse a fetched page and normalize every post on it
pub fn extract_page(
    extractor: &dyn ContentExtractor,
    body: &str,
    observed_at: DateTime<Utc>,
) -> Result<Vec<InternetContent>> {
    let page = Html::parse_document(body);
    let posts = extractor.extract(&page)?;
    Ok(posts
        .into_iter()
        .map(|post| normalize(extractor.source_id(), post, observed_at))
        .collect())
}

/// Fetch, extract and save a single source
pub async fn ingest_source(
    store: &ContentStore,
    fetcher: &Fetcher,
    extractor: &dyn ContentExtractor,
) -> Result<(usize, SaveStats)> {
    let body = fetcher.fetch(extractor.base_location()).await?;
    let contents = extract_page(extractor, &body, Utc::now())?;
    let saved = store.save(&contents).await?;

    info!(
        "{}: {} posts, {} new, {} already stored",
        extractor.source_id(),
        contents.len(),
        saved.contents_created,
        saved.contents_skipped
    );
    Ok((contents.len(), saved))
}

/// Ingest each source in order; a failing source does not stop the others
pub async fn cmd_ingest(
    store: &ContentStore,
    fetcher: &Fetcher,
    extractors: &[Box<dyn ContentExtractor>],
) -> IngestStats {
    let mut stats = IngestStats::default();
    let progress = source_progress_bar(extractors.len());

    for extractor in extractors {
        let source = extractor.source_id();
        progress.set_message(source.to_string());

        let report = match ingest_source(store, fetcher, extractor.as_ref()).await {
            Ok((posts_extracted, saved)) => SourceReport {
                source,
                posts_extracted,
                saved,
                error: None,
            },
            Err(e) => {
                error!("{}: {}", source, e);
                SourceReport {
                    source,
                    posts_extracted: 0,
                    saved: SaveStats::default(),
                    error: Some(e.to_string()),
                }
            }
        };
        stats.sources.push(report);
        progress.inc(1);
    }

    progress.finish_and_clear();
    stats
}

/// Print ingest results to console
pub fn print_ingest_stats(stats: &IngestStats) {
    println!("\n✓ Ingestion complete");
    for report in &stats.sources {
        match &report.error {
            Some(e) => println!("  ✗ {}: {}", report.source, e),
            None => println!(
                "  • {}: {} posts, {} new, {} already stored",
                report.source,
                report.posts_extracted,
                report.saved.contents_created,
                report.saved.contents_skipped
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::error::Error;
    use crate::extract::{HackerNews, IndieHackers};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HN_PAGE: &str = r#"<html><body><table class="itemlist">
        <tr class="athing"><td class="title"><a href="https://example.org/a" class="titlelink">Post A</a></td></tr>
        <tr><td class="subtext"><span class="score">95 points</span> by
            <a href="user?id=u">u</a> <span class="age" title="2022-04-27T09:28:57"><a href="item?id=1">12 hours ago</a></span>
            | <a href="hide?id=1">hide</a> | <a href="item?id=1">71&nbsp;comments</a></td></tr>
        <tr class="spacer"></tr>
        <tr class="athing"><td class="title"><a href="item?id=2" class="titlelink">Company is hiring</a></td></tr>
        <tr><td class="subtext"><span class="age" title="2022-04-27T08:00:00"><a href="item?id=2">3 hours ago</a></span>
            | <a href="hide?id=2">hide</a></td></tr>
        <tr class="spacer"></tr>
        <tr class="morespace"></tr>
        <tr><td><a href="news?p=2" class="morelink">More</a></td></tr>
    </table></body></html>"#;

    async fn setup() -> (ContentStore, Fetcher, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = ContentStore::new(&tmp.path().join("content.db")).await.unwrap();
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        (store, fetcher, tmp)
    }

    #[test]
    fn test_extract_page_normalizes_posts() {
        let observed = Utc::now();
        let contents = extract_page(&HackerNews::new(), HN_PAGE, observed).unwrap();

        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].source, SourceId::HackerNewsNews);
        assert_eq!(contents[0].extra_fields.get("upvotes").and_then(|v| v.as_integer()), Some(95));
        assert_eq!(contents[0].extra_fields.get("comments").and_then(|v| v.as_integer()), Some(71));
        assert_eq!(contents[1].url, "https://news.ycombinator.com/item?id=2");
        assert_eq!(contents[1].extra_fields.get("upvotes").and_then(|v| v.as_integer()), Some(0));
        assert_eq!(contents[1].extra_fields.get("comments").and_then(|v| v.as_integer()), Some(0));
    }

    #[tokio::test]
    async fn test_failing_source_does_not_stop_others() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hn"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(HN_PAGE.as_bytes().to_vec(), "text/html"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ih"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let (store, fetcher, _tmp) = setup().await;
        let extractors: Vec<Box<dyn ContentExtractor>> = vec![
            Box::new(IndieHackers::with_base(format!("{}/ih", mock_server.uri()))),
            Box::new(HackerNews::with_base(format!("{}/hn", mock_server.uri()))),
        ];

        let stats = cmd_ingest(&store, &fetcher, &extractors).await;
        assert_eq!(stats.failures(), 1);
        assert!(stats.sources[0].error.as_deref().unwrap_or_default().contains("500"));
        assert_eq!(stats.sources[1].posts_extracted, 2);
        assert_eq!(stats.contents_created(), 2);

        let saved = store.get(&[SourceId::HackerNewsNews], 36500).await.unwrap();
        assert_eq!(saved.len(), 2);
        let err = store.get(&[SourceId::IndieHackersPopular], 7).await.unwrap_err();
        assert!(matches!(err, Error::LocationNotFound(_)));

        // Second run sees the same posts and stores nothing new
        let stats = cmd_ingest(&store, &fetcher, &extractors[1..]).await;
        assert_eq!(stats.sources[0].saved.contents_created, 0);
        assert_eq!(stats.sources[0].saved.contents_skipped, 2);
        assert_eq!(store.stats().await.unwrap().content_count, 2);
    }

    #[tokio::test]
    async fn test_layout_change_saves_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                b"<html><body><div class=\"feed\"></div></body></html>".to_vec(),
                "text/html",
            ))
            .mount(&mock_server)
            .await;

        let (store, fetcher, _tmp) = setup().await;
        let extractor = IndieHackers::with_base(mock_server.uri());

        let err = ingest_source(&store, &fetcher, &extractor).await.unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
        assert_eq!(store.stats().await.unwrap().location_count, 0);
    }

    #[test]
    fn test_select_extractors() {
        let mut config = Config::default();
        config.sources.enabled = vec!["hackerNews-news".to_string()];

        let configured = select_extractors(&config, None).unwrap();
        assert_eq!(configured.len(), 1);
        assert_eq!(configured[0].source_id(), SourceId::HackerNewsNews);

        let requested =
            select_extractors(&config, Some(&[SourceId::IndieHackersPopular][..])).unwrap();
        assert_eq!(requested[0].source_id(), SourceId::IndieHackersPopular);
    }
}
