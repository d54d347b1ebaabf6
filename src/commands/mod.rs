//! CLI commands implementation

pub mod ingest;
pub mod init;
pub mod query;
pub mod status;

pub use ingest::*;
pub use init::*;
pub use query::*;
pub use status::*;

use crate::error::Result;
use crate::extract::SourceId;

/// Parse source identifiers given on the command line, dropping repeats
pub fn parse_sources(raw: &[String]) -> Result<Vec<SourceId>> {
    let mut sources = Vec::with_capacity(raw.len());
    for value in raw {
        let id: SourceId = value.parse()?;
        if !sources.contains(&id) {
            sources.push(id);
        }
    }
    Ok(sources)
}
