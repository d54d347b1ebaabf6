//! Custom error types for harvest

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Fetch failed for {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    #[error("Extraction failed for {source_id}: {message}")]
    Extraction { source_id: String, message: String },

    #[error("No location recorded for source '{0}'; ingest it at least once first")]
    LocationNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Already initialized at {0}")]
    AlreadyInitialized(String),
}

impl Error {
    /// Build an extraction failure for the given source
    pub fn extraction(source_id: impl ToString, message: impl Into<String>) -> Self {
        Error::Extraction {
            source_id: source_id.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for harvest
pub type Result<T> = std::result::Result<T, Error>;
