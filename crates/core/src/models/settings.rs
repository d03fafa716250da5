use serde::{Deserialize, Serialize};

/// Dashboard configuration. Plain data — the refresh orchestrator reads
/// it once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds between automatic refresh cycles.
    pub refresh_interval_secs: u64,

    /// Time-to-live for the last fetched quote snapshot, in seconds.
    /// A refresh within this window reuses the cached snapshot instead
    /// of calling upstream sources. `None` disables caching entirely.
    pub quote_ttl_secs: Option<u64>,

    /// Per-source fetch timeout, in seconds. A hung upstream call fails
    /// that source for the cycle instead of stalling it forever.
    pub fetch_timeout_secs: u64,

    /// CSV export URL for the fundamentals sheet source, if configured.
    pub fundamentals_sheet_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 15,
            quote_ttl_secs: Some(10),
            fetch_timeout_secs: 30,
            fundamentals_sheet_url: None,
        }
    }
}
