//! Configuration for capsearch-rs
//!
//! Defaults reproduce the stock behavior: `<b>`/`</b>` highlight markers,
//! five autocomplete suggestions, and orphaned captions tolerated.

use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Query-side settings
    pub search: SearchConfig,

    /// Ingestion-side settings
    pub ingest: IngestConfig,
}

/// Settings for the query engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Marker inserted before each matched term span (e.g., `"<b>"`)
    pub highlight_open: String,

    /// Marker inserted after each matched term span (e.g., `"</b>"`)
    pub highlight_close: String,

    /// Maximum number of autocomplete suggestions returned
    pub autocomplete_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            highlight_open: "<b>".to_string(),
            highlight_close: "</b>".to_string(),
            autocomplete_limit: 5,
        }
    }
}

/// How `insert_captions` treats a `video_id` with no matching video
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// Accept the captions; searches over them report a null video title
    #[default]
    Tolerate,

    /// Reject the insert with `DanglingReference` before writing anything
    Enforce,
}

/// Settings for the ingestion write path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Whether caption inserts must reference an existing video
    pub reference_policy: ReferencePolicy,
}
