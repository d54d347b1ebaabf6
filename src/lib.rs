//! harvest - scrape post listings from a fixed set of sites into SQLite
//!
//! This crate provides:
//! - Per-site markup extractors producing raw posts
//! - A normalizer that gives every post a stable id and ordered extra fields
//! - A SQLite content store with idempotent saves and recency queries
//! - CLI commands wiring fetch, extract and save together

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod progress;
pub mod store;

pub use config::Config;
pub use content::{normalize, ExtraFields, FieldValue, InternetContent};
pub use error::{Error, Result};
pub use extract::{ContentExtractor, RawPost, SourceId};
pub use store::ContentStore;
