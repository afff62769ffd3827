//! Batch ingestion through the store

use crate::error::{CapsearchError, Result};
use crate::ingest::records::VideoRecord;
use crate::storage::{Cue, Store};

/// Totals for one ingestion batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Videos created
    pub videos_added: usize,

    /// Videos skipped because their id already existed
    pub videos_skipped: usize,

    /// Caption segments written (with their index entries)
    pub segments_added: usize,

    /// Cues rejected for violating the timing invariant
    pub segments_rejected: usize,
}

/// Register a batch of videos
///
/// A duplicate id is logged and skipped; ingestion of the remaining videos
/// continues. Storage failures abort the batch.
pub fn ingest_videos(store: &Store, records: &[VideoRecord]) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for record in records {
        match store.create_video(&record.id, &record.title) {
            Ok(()) => report.videos_added += 1,
            Err(CapsearchError::DuplicateId(id)) => {
                log::warn!("Skipping duplicate video id {}", id);
                report.videos_skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "Registered {} videos ({} duplicates skipped)",
        report.videos_added,
        report.videos_skipped
    );
    Ok(report)
}

/// Insert one video's caption cues
///
/// Cues violating `end >= start >= 0` (or carrying non-finite offsets) are
/// rejected with a warning, not clipped. The surviving cues are written in
/// one atomic call.
pub fn ingest_captions(store: &Store, video_id: &str, cues: Vec<Cue>) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    let mut accepted = Vec::with_capacity(cues.len());
    for cue in cues {
        if cue.is_well_formed() {
            accepted.push(cue);
        } else {
            log::warn!(
                "Rejecting cue with invalid timing (start={}, end={}): {:?}",
                cue.start,
                cue.end,
                cue.text
            );
            report.segments_rejected += 1;
        }
    }

    if !accepted.is_empty() {
        let rowids = store.insert_captions(video_id, &accepted)?;
        report.segments_added = rowids.len();
    }

    Ok(report)
}
