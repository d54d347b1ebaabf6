//! Content storage using SQLite
//!
//! Two tables back the store:
//! - Locations (one per source identifier, created on first save)
//! - Contents (normalized posts, keyed by their stable content id)
//!
//! Saves are idempotent. A content id that is already stored is left untouched,
//! so re-ingesting a page never rewrites history.

mod schema;

pub use schema::*;

use crate::config::Config;
use crate::content::InternetContent;
use crate::error::{Error, Result};
use crate::extract::SourceId;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Persisted identity of a source
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub identifier: String,
    pub created_at: String,
}

/// A location with a summary of what has been stored for it
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LocationSummary {
    pub identifier: String,
    pub created_at: String,
    pub content_count: i64,
    pub newest: Option<String>,
}

/// Outcome of a single save batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveStats {
    pub locations_created: usize,
    pub contents_created: usize,
    /// Records whose id was already stored
    pub contents_skipped: usize,
}

/// Global statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub location_count: usize,
    pub content_count: usize,
}

#[derive(Debug, FromRow)]
struct ContentRow {
    id: String,
    timestamp: String,
    title: String,
    url: String,
    location: String,
    extra_fields: String,
}

impl ContentRow {
    fn into_content(self) -> Result<InternetContent> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| Error::Database(sqlx::Error::Decode(Box::new(e))))?
            .with_timezone(&Utc);

        Ok(InternetContent {
            id: self.id,
            timestamp,
            title: self.title,
            url: self.url,
            source: self.location.parse()?,
            extra_fields: serde_json::from_str(&self.extra_fields)?,
        })
    }
}

/// Stored form of a timestamp; lexicographic order matches time order
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Content database handle
#[derive(Clone)]
pub struct ContentStore {
    pool: SqlitePool,
}

impl ContentStore {
    /// Connect to the content database configured for this installation
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::open(&config.paths.db_file).await
    }

    /// Open the database at `db_path` and create the schema if it is missing
    pub async fn new(db_path: &Path) -> Result<Self> {
        let store = Self::open(db_path).await?;

        if !store.is_initialized().await? {
            store.init_schema().await?;
        }

        Ok(store)
    }

    async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Check if database is initialized
    pub async fn is_initialized(&self) -> Result<bool> {
        let result: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM sqlite_master WHERE type='table' AND name='contents'")
                .fetch_optional(&self.pool)
                .await?;
        Ok(result.is_some())
    }

    // ===== Writes =====

    /// Save a batch of records in one transaction
    ///
    /// Locations are created for any source seen for the first time. Records
    /// whose id already exists are skipped, even if their fields differ.
    pub async fn save(&self, contents: &[InternetContent]) -> Result<SaveStats> {
        let mut stats = SaveStats::default();
        if contents.is_empty() {
            return Ok(stats);
        }

        let now = format_timestamp(&Utc::now());
        let mut tx = self.pool.begin().await?;

        let mut location_ids: HashMap<SourceId, i64> = HashMap::new();
        for content in contents {
            if location_ids.contains_key(&content.source) {
                continue;
            }

            let inserted = sqlx::query(
                "INSERT INTO locations (identifier, created_at) VALUES (?, ?) ON CONFLICT(identifier) DO NOTHING",
            )
            .bind(content.source.as_str())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
            if inserted.rows_affected() > 0 {
                debug!("Created location {}", content.source);
                stats.locations_created += 1;
            }

            let id: i64 = sqlx::query_scalar("SELECT id FROM locations WHERE identifier = ?")
                .bind(content.source.as_str())
                .fetch_one(&mut *tx)
                .await?;
            location_ids.insert(content.source, id);
        }

        for content in contents {
            let extra_fields = serde_json::to_string(&content.extra_fields)?;
            let inserted = sqlx::query(
                r#"
                INSERT INTO contents (id, timestamp, title, url, location_id, extra_fields)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(&content.id)
            .bind(format_timestamp(&content.timestamp))
            .bind(&content.title)
            .bind(&content.url)
            .bind(location_ids[&content.source])
            .bind(extra_fields)
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() > 0 {
                stats.contents_created += 1;
            } else {
                stats.contents_skipped += 1;
            }
        }

        tx.commit().await?;
        Ok(stats)
    }

    // ===== Reads =====

    /// Get the location recorded for a source
    pub async fn location(&self, source: SourceId) -> Result<Location> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE identifier = ?")
            .bind(source.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::LocationNotFound(source.to_string()))
    }

    /// Records from the given sources observed within the last `since_days` days
    ///
    /// A window reaching past the earliest representable date has no lower bound.
    pub async fn get(&self, sources: &[SourceId], since_days: u32) -> Result<Vec<InternetContent>> {
        let cutoff = Duration::try_days(i64::from(since_days))
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.get_since(sources, cutoff).await
    }

    /// Records from the given sources stamped at or after `cutoff`, newest first
    ///
    /// Every source must have been saved at least once.
    pub async fn get_since(
        &self,
        sources: &[SourceId],
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<InternetContent>> {
        let mut location_ids = Vec::with_capacity(sources.len());
        for source in sources {
            location_ids.push(self.location(*source).await?.id);
        }
        if location_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = location_ids
            .iter()
            .map(|_| "?")
            .collect::<Vec<_>>()
            .join(",");
        let query = format!(
            r#"
            SELECT c.id, c.timestamp, c.title, c.url, l.identifier AS location, c.extra_fields
            FROM contents c
            JOIN locations l ON c.location_id = l.id
            WHERE c.location_id IN ({}) AND c.timestamp >= ?
            ORDER BY c.timestamp DESC, c.id
            "#,
            placeholders
        );

        let mut query_builder = sqlx::query_as::<_, ContentRow>(&query);
        for id in &location_ids {
            query_builder = query_builder.bind(*id);
        }
        let rows = query_builder
            .bind(format_timestamp(&cutoff))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ContentRow::into_content).collect()
    }

    /// List all locations with their content counts
    pub async fn list_locations(&self) -> Result<Vec<LocationSummary>> {
        let locations = sqlx::query_as::<_, LocationSummary>(
            r#"
            SELECT l.identifier, l.created_at,
                   COUNT(c.id) AS content_count,
                   MAX(c.timestamp) AS newest
            FROM locations l
            LEFT JOIN contents c ON c.location_id = l.id
            GROUP BY l.id
            ORDER BY l.identifier
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }

    /// Get global statistics
    pub async fn stats(&self) -> Result<StoreStats> {
        let location_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
            .fetch_one(&self.pool)
            .await?;

        let content_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contents")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreStats {
            location_count: location_count as usize,
            content_count: content_count as usize,
        })
    }
}
