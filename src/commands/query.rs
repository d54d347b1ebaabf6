//! Query command implementation

use crate::config::Config;
use crate::content::InternetContent;
use crate::error::Result;
use crate::extract::SourceId;
use crate::store::ContentStore;
use tracing::info;

/// Query options
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Restrict to these sources (defaults to the enabled ones)
    pub sources: Option<Vec<SourceId>>,
    /// Recency window in days (defaults to query.default_since_days)
    pub since_days: Option<u32>,
    /// Maximum number of records to return
    pub limit: Option<usize>,
}

/// Fetch stored records, newest first
pub async fn cmd_query(
    config: &Config,
    store: &ContentStore,
    options: QueryOptions,
) -> Result<Vec<InternetContent>> {
    let sources = match options.sources {
        Some(sources) => sources,
        None => config.enabled_sources()?,
    };
    let since_days = options.since_days.unwrap_or(config.query.default_since_days);

    info!(
        "Querying {} source(s) over the last {} day(s)",
        sources.len(),
        since_days
    );

    let mut results = store.get(&sources, since_days).await?;
    if let Some(limit) = options.limit {
        results.truncate(limit);
    }
    Ok(results)
}

/// Print query results to console
pub fn print_query_results(results: &[InternetContent]) {
    if results.is_empty() {
        println!("No content found.");
        return;
    }

    println!("\n📰 {} result(s)\n", results.len());

    for content in results {
        println!("• {}", content.title);
        println!("  {}", content.url);
        let fields: Vec<String> = content
            .extra_fields
            .iter()
            .filter(|(key, _)| *key != "published")
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();
        println!(
            "  [{}] {} | {}",
            content.source,
            content.timestamp.format("%Y-%m-%d %H:%M"),
            fields.join(", ")
        );
        println!();
    }
}
