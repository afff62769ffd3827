//! Ingestion adapter for capsearch-rs
//!
//! Accepts already-parsed video records and caption cues and writes them
//! through the store. File parsing helpers cover the two batch inputs the
//! system consumes: a JSON array of video metadata and per-video timed-text
//! caption tracks. Fetching either from the network is someone else's job.

pub mod adapter;
pub mod records;
pub mod timedtext;

// Re-export main types
pub use adapter::{IngestReport, ingest_captions, ingest_videos};
pub use records::{VideoRecord, load_video_records};
pub use timedtext::parse_timedtext;
