//! Database schema definitions

/// Database schema version
pub const SCHEMA_VERSION: u32 = 1;

/// SQL for creating the videos table
pub const CREATE_VIDEOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL
);
"#;

/// SQL for creating the captions table
///
/// `start`/`end` are millisecond offsets into the video timeline. The
/// foreign key is declarative only; enforcement is a store-level policy.
pub const CREATE_CAPTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS captions (
    video_id TEXT NOT NULL,
    text TEXT NOT NULL,
    start REAL NOT NULL,
    "end" REAL NOT NULL,
    FOREIGN KEY (video_id) REFERENCES videos(id)
);
"#;

/// SQL for creating the caption full-text index
///
/// Rows are keyed by the rowid of the caption they were derived from and
/// written only through `storage::sync`, inside the same transaction as the
/// caption mutation.
pub const CREATE_CAPTIONS_INDEX: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS captions_index USING fts5(
    text,
    tokenize='porter unicode61'
);
"#;

/// SQL for creating the metadata table
pub const CREATE_METADATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// SQL for creating indexes on the captions table
pub const CREATE_CAPTIONS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_captions_video ON captions(video_id);
"#;
