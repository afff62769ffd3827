//! # capsearch-rs
//!
//! Ranked full-text search and autocomplete over timed video captions,
//! backed by embedded SQLite with a synchronized FTS5 index.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use capsearch_rs::{Cue, QueryEngine, Store};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open (or create) a caption database
//!     let store = Store::open("captions.db")?;
//!
//!     // Register a video and its caption track
//!     store.create_video("v1", "Cats")?;
//!     store.insert_captions(
//!         "v1",
//!         &[Cue { text: "the cat runs fast".into(), start: 0.0, end: 1000.0 }],
//!     )?;
//!
//!     // Stemmed, ranked, highlighted search
//!     let engine = QueryEngine::new(store);
//!     for result in engine.search("running")? {
//!         println!("[{}] {}", result.video_id, result.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod ingest;
pub mod query;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main API types
pub use config::{Config, IngestConfig, ReferencePolicy, SearchConfig};
pub use error::{CapsearchError, Result};
pub use ingest::{IngestReport, VideoRecord};
pub use query::{QueryEngine, SearchBackend, SearchResult};
pub use storage::{CaptionSegment, Cue, Store, StoreStats, Video};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_imports() {
        // Ensure all major types can be imported
        let _config = Config::default();
    }
}
