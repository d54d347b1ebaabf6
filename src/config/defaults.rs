//! Default values for configuration

use crate::extract::SourceId;

/// Default user agent, overridable with HARVEST_USER_AGENT
pub fn default_fetch_user_agent() -> String {
    std::env::var("HARVEST_USER_AGENT")
        .unwrap_or_else(|_| format!("harvest/{}", env!("CARGO_PKG_VERSION")))
}

/// Default request timeout in seconds
pub fn default_fetch_timeout() -> u64 {
    30
}

/// Default maximum redirects followed per request
pub fn default_fetch_max_redirects() -> usize {
    5
}

/// Default recency window for queries, in days
pub fn default_query_since_days() -> u32 {
    7
}

/// Default enabled sources: everything registered
pub fn default_enabled_sources() -> Vec<String> {
    SourceId::ALL.iter().map(|id| id.to_string()).collect()
}
