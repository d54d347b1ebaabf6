//! Status and locations commands

use crate::config::Config;
use crate::error::Result;
use crate::store::{ContentStore, LocationSummary, StoreStats};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub db_path: String,
    pub enabled_sources: Vec<String>,
    pub default_since_days: u32,
    pub db_stats: StoreStats,
}

/// Get system status
pub async fn cmd_status(config: &Config, store: &ContentStore) -> Result<StatusInfo> {
    info!("Getting status");

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
        enabled_sources: config.sources.enabled.clone(),
        default_since_days: config.query.default_since_days,
        db_stats: store.stats().await?,
    })
}

/// List all locations with their stats
pub async fn cmd_list_locations(store: &ContentStore) -> Result<Vec<LocationSummary>> {
    info!("Listing locations");
    store.list_locations().await
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 harvest Status\n");
    println!("Configuration: {}", status.config_path);
    println!("Database: {}", status.db_path);
    println!("\nEnabled sources: {}", status.enabled_sources.join(", "));
    println!("Default query window: {} day(s)", status.default_since_days);
    println!("\nDatabase Stats:");
    println!("  Locations: {}", status.db_stats.location_count);
    println!("  Contents: {}", status.db_stats.content_count);
}

/// Print locations list to console
pub fn print_locations(locations: &[LocationSummary]) {
    println!("\n📍 Locations\n");

    if locations.is_empty() {
        println!("No locations yet. Use 'harvest ingest' to fetch content.");
        return;
    }

    for location in locations {
        println!("• {}", location.identifier);
        println!("  Contents: {}", location.content_count);
        println!(
            "  Newest: {}",
            location.newest.as_deref().unwrap_or("-")
        );
        println!("  Created: {}", location.created_at);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_on_empty_store() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_base_dir(Some(tmp.path().to_path_buf()));
        let store = ContentStore::new(&config.paths.db_file).await.unwrap();

        let status = cmd_status(&config, &store).await.unwrap();
        assert_eq!(status.db_stats.content_count, 0);
        assert_eq!(status.default_since_days, 7);
        assert!(status.db_path.ends_with("content.db"));
        assert!(cmd_list_locations(&store).await.unwrap().is_empty());
    }
}
