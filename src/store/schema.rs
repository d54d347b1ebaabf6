//! SQLite schema definition

/// SQL schema for the content database
pub const SCHEMA_SQL: &str = r#"
-- Locations: one row per source identifier
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

-- Contents: normalized posts, first write wins
CREATE TABLE IF NOT EXISTS contents (
    id TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    location_id INTEGER NOT NULL REFERENCES locations(id),
    extra_fields TEXT NOT NULL
);

-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_contents_location ON contents(location_id);
CREATE INDEX IF NOT EXISTS idx_contents_timestamp ON contents(timestamp);
"#;
