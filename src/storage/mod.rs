//! Storage functionality for capsearch-rs
//!
//! This module owns the primary data: videos and their timed caption
//! segments, persisted in embedded SQLite, plus the synchronized full-text
//! index derived from caption text.

pub mod schema;
pub mod store;
pub(crate) mod sync;

// Re-export main types
pub use store::Store;

use serde::{Deserialize, Serialize};

/// A source video, identified by its external platform id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Opaque unique identifier (external platform ID)
    pub id: String,

    /// Display title
    pub title: String,
}

/// One timed span of transcript text, as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    /// Surrogate identity, assigned at creation; join key into the index
    pub rowid: i64,

    /// Id of the video this caption belongs to
    pub video_id: String,

    /// Decoded human-readable caption text (no markup)
    pub text: String,

    /// Millisecond offset where the caption appears
    pub start: f64,

    /// Millisecond offset where the caption disappears
    pub end: f64,
}

/// One parsed caption cue, ready to be inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Decoded caption text
    pub text: String,

    /// Millisecond start offset
    pub start: f64,

    /// Millisecond end offset
    pub end: f64,
}

impl Cue {
    /// Whether the cue satisfies the timing invariant `end >= start >= 0`
    /// with finite offsets
    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.end >= self.start
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Number of videos
    pub video_count: usize,

    /// Number of caption segments
    pub caption_count: usize,

    /// Number of full-text index entries (equals `caption_count` whenever
    /// the synchronization invariant holds)
    pub index_entry_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_well_formed() {
        let cue = Cue {
            text: "hello".to_string(),
            start: 0.0,
            end: 1000.0,
        };
        assert!(cue.is_well_formed());

        // Zero-length cues are valid
        let cue = Cue {
            text: "blip".to_string(),
            start: 500.0,
            end: 500.0,
        };
        assert!(cue.is_well_formed());
    }

    #[test]
    fn test_cue_malformed() {
        let inverted = Cue {
            text: "x".to_string(),
            start: 1000.0,
            end: 0.0,
        };
        assert!(!inverted.is_well_formed());

        let negative = Cue {
            text: "x".to_string(),
            start: -1.0,
            end: 10.0,
        };
        assert!(!negative.is_well_formed());

        let nan = Cue {
            text: "x".to_string(),
            start: f64::NAN,
            end: 10.0,
        };
        assert!(!nan.is_well_formed());
    }
}
