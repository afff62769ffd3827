//! Video metadata records

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One video to register, as supplied by the metadata export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Opaque platform id
    pub id: String,

    /// Display title
    pub title: String,
}

/// Load video records from a JSON file containing an array of
/// `{"id": ..., "title": ...}` objects
pub fn load_video_records<P: AsRef<Path>>(path: P) -> Result<Vec<VideoRecord>> {
    let data = std::fs::read_to_string(path)?;
    let records = serde_json::from_str(&data)?;
    Ok(records)
}
