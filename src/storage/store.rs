//! SQLite-backed caption store
//!
//! This module provides the durable record of videos and caption segments
//! using embedded SQLite. Every caption mutation carries its index
//! propagation (see `storage::sync`) inside the same transaction, so the
//! full-text index can never be observed out of step with the captions
//! table. The store handle is explicitly constructed and shared via `Arc`;
//! there is no ambient global connection.

use crate::config::{IngestConfig, ReferencePolicy};
use crate::error::{CapsearchError, Result};
use crate::storage::schema::*;
use crate::storage::sync;
use crate::storage::{CaptionSegment, Cue, StoreStats, Video};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Caption store: owns the database connection and the write path
pub struct Store {
    conn: Mutex<Connection>,
    reference_policy: ReferencePolicy,
}

impl Store {
    /// Open (or create) a store at the given path with default ingestion
    /// settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, IngestConfig::default())
    }

    /// Open (or create) a store at the given path
    pub fn open_with<P: AsRef<Path>>(path: P, config: IngestConfig) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| CapsearchError::Storage(format!("Failed to open database: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            reference_policy: config.reference_policy,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn memory() -> Result<Self> {
        Self::memory_with(IngestConfig::default())
    }

    /// Create an in-memory store with explicit ingestion settings
    pub fn memory_with(config: IngestConfig) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            CapsearchError::Storage(format!("Failed to create in-memory database: {}", e))
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            reference_policy: config.reference_policy,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        let conn = self.lock();

        // The captions foreign key is declarative only; enforcement is a
        // store-level policy (see schema::CREATE_CAPTIONS_TABLE). Keep SQLite's
        // standard default of disabled FK enforcement explicitly, since some
        // bundled SQLite builds are compiled with SQLITE_DEFAULT_FOREIGN_KEYS=1.
        conn.execute("PRAGMA foreign_keys=OFF", [])
            .map_err(|e| CapsearchError::Storage(format!("Failed to disable FK enforcement: {}", e)))?;

        // Enable WAL mode for better concurrency
        let _: String = conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(|e| CapsearchError::Storage(format!("Failed to enable WAL mode: {}", e)))?;

        conn.execute_batch(CREATE_VIDEOS_TABLE)
            .map_err(|e| CapsearchError::Storage(format!("Failed to create videos table: {}", e)))?;

        conn.execute_batch(CREATE_CAPTIONS_TABLE).map_err(|e| {
            CapsearchError::Storage(format!("Failed to create captions table: {}", e))
        })?;

        conn.execute_batch(CREATE_CAPTIONS_INDEX).map_err(|e| {
            CapsearchError::Storage(format!("Failed to create caption index: {}", e))
        })?;

        conn.execute_batch(CREATE_METADATA_TABLE).map_err(|e| {
            CapsearchError::Storage(format!("Failed to create metadata table: {}", e))
        })?;

        conn.execute_batch(CREATE_CAPTIONS_INDEXES)
            .map_err(|e| CapsearchError::Storage(format!("Failed to create indexes: {}", e)))?;

        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)",
            params![SCHEMA_VERSION.to_string()],
        )
        .map_err(|e| CapsearchError::Storage(format!("Failed to set schema version: {}", e)))?;

        log::info!("Store initialized with schema version {}", SCHEMA_VERSION);
        Ok(())
    }

    /// Access the underlying connection (query engine and tests only)
    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    /// Create a video record
    ///
    /// Fails with `DuplicateId` if a video with this id already exists.
    pub fn create_video(&self, id: &str, title: &str) -> Result<()> {
        let conn = self.lock();
        match conn.execute(
            "INSERT INTO videos (id, title) VALUES (?1, ?2)",
            params![id, title],
        ) {
            Ok(_) => {
                log::debug!("Created video {}", id);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(CapsearchError::DuplicateId(id.to_string()))
            }
            Err(e) => Err(CapsearchError::Storage(format!(
                "Failed to insert video {}: {}",
                id, e
            ))),
        }
    }

    /// Insert one video's caption cues and their index entries in a single
    /// transaction
    ///
    /// Returns the assigned rowids in input order. Either every segment and
    /// its index entry become visible together, or none do. Under the
    /// `Enforce` reference policy the insert fails with `DanglingReference`
    /// when the video does not exist; under `Tolerate` (the default) the
    /// orphaned captions are accepted and surface with a null title in
    /// search results.
    pub fn insert_captions(&self, video_id: &str, cues: &[Cue]) -> Result<Vec<i64>> {
        let mut conn = self.lock();

        if self.reference_policy == ReferencePolicy::Enforce {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM videos WHERE id = ?1",
                    params![video_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| {
                    CapsearchError::Storage(format!("Failed to check video {}: {}", video_id, e))
                })?;
            if exists.is_none() {
                return Err(CapsearchError::DanglingReference(video_id.to_string()));
            }
        }

        let tx = conn
            .transaction()
            .map_err(|e| CapsearchError::Storage(format!("Failed to start transaction: {}", e)))?;

        let mut rowids = Vec::with_capacity(cues.len());
        {
            let mut stmt = tx
                .prepare(
                    r#"INSERT INTO captions (video_id, text, start, "end") VALUES (?1, ?2, ?3, ?4)"#,
                )
                .map_err(|e| {
                    CapsearchError::Storage(format!("Failed to prepare statement: {}", e))
                })?;

            for cue in cues {
                stmt.execute(params![video_id, cue.text, cue.start, cue.end])
                    .map_err(|e| {
                        CapsearchError::Storage(format!(
                            "Failed to insert caption for video {}: {}",
                            video_id, e
                        ))
                    })?;
                let rowid = tx.last_insert_rowid();

                sync::on_insert(&tx, rowid, &cue.text).map_err(|e| {
                    CapsearchError::Storage(format!("Failed to index caption {}: {}", rowid, e))
                })?;
                rowids.push(rowid);
            }
        }

        tx.commit()
            .map_err(|e| CapsearchError::Storage(format!("Failed to commit transaction: {}", e)))?;

        log::info!(
            "Inserted {} caption segments for video {}",
            rowids.len(),
            video_id
        );
        Ok(rowids)
    }

    /// Replace the text of one caption segment, updating its index entry in
    /// the same transaction
    pub fn update_caption_text(&self, rowid: i64, new_text: &str) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn
            .transaction()
            .map_err(|e| CapsearchError::Storage(format!("Failed to start transaction: {}", e)))?;

        let updated = tx
            .execute(
                "UPDATE captions SET text = ?2 WHERE rowid = ?1",
                params![rowid, new_text],
            )
            .map_err(|e| {
                CapsearchError::Storage(format!("Failed to update caption {}: {}", rowid, e))
            })?;

        if updated == 0 {
            return Err(CapsearchError::Storage(format!(
                "No caption with rowid {}",
                rowid
            )));
        }

        sync::on_update(&tx, rowid, new_text).map_err(|e| {
            CapsearchError::Storage(format!("Failed to reindex caption {}: {}", rowid, e))
        })?;

        tx.commit()
            .map_err(|e| CapsearchError::Storage(format!("Failed to commit transaction: {}", e)))?;
        Ok(())
    }

    /// Delete one caption segment and its index entry in the same
    /// transaction
    pub fn delete_caption(&self, rowid: i64) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn
            .transaction()
            .map_err(|e| CapsearchError::Storage(format!("Failed to start transaction: {}", e)))?;

        tx.execute("DELETE FROM captions WHERE rowid = ?1", params![rowid])
            .map_err(|e| {
                CapsearchError::Storage(format!("Failed to delete caption {}: {}", rowid, e))
            })?;

        sync::on_delete(&tx, rowid).map_err(|e| {
            CapsearchError::Storage(format!("Failed to unindex caption {}: {}", rowid, e))
        })?;

        tx.commit()
            .map_err(|e| CapsearchError::Storage(format!("Failed to commit transaction: {}", e)))?;
        Ok(())
    }

    /// Look up a video by id
    pub fn get_video(&self, id: &str) -> Result<Option<Video>> {
        let conn = self.lock();
        let video = conn
            .query_row(
                "SELECT id, title FROM videos WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Video {
                        id: row.get(0)?,
                        title: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|e| CapsearchError::Storage(format!("Failed to query video {}: {}", id, e)))?;
        Ok(video)
    }

    /// Fetch caption segments by rowid
    ///
    /// Rowids with no matching segment are simply absent from the result.
    pub fn captions_by_rowids(&self, rowids: &[i64]) -> Result<HashMap<i64, CaptionSegment>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(r#"SELECT rowid, video_id, text, start, "end" FROM captions WHERE rowid = ?1"#)
            .map_err(|e| CapsearchError::Storage(format!("Failed to prepare query: {}", e)))?;

        let mut segments = HashMap::with_capacity(rowids.len());
        for &rowid in rowids {
            let segment = stmt
                .query_row(params![rowid], |row| {
                    Ok(CaptionSegment {
                        rowid: row.get(0)?,
                        video_id: row.get(1)?,
                        text: row.get(2)?,
                        start: row.get(3)?,
                        end: row.get(4)?,
                    })
                })
                .optional()
                .map_err(|e| {
                    CapsearchError::Storage(format!("Failed to query caption {}: {}", rowid, e))
                })?;
            if let Some(segment) = segment {
                segments.insert(rowid, segment);
            }
        }
        Ok(segments)
    }

    /// Drop all index entries and re-derive them from stored captions
    ///
    /// Returns the number of entries written.
    pub fn rebuild_index(&self) -> Result<usize> {
        let mut conn = self.lock();
        let tx = conn
            .transaction()
            .map_err(|e| CapsearchError::Storage(format!("Failed to start transaction: {}", e)))?;

        let written = sync::rebuild(&tx)
            .map_err(|e| CapsearchError::Storage(format!("Failed to rebuild index: {}", e)))?;

        tx.commit()
            .map_err(|e| CapsearchError::Storage(format!("Failed to commit transaction: {}", e)))?;

        log::info!("Rebuilt caption index with {} entries", written);
        Ok(written)
    }

    /// Get store statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.lock();
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = conn
                .query_row(sql, [], |row| row.get(0))
                .map_err(|e| CapsearchError::Storage(format!("Failed to count rows: {}", e)))?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            video_count: count("SELECT COUNT(*) FROM videos")?,
            caption_count: count("SELECT COUNT(*) FROM captions")?,
            index_entry_count: count("SELECT COUNT(*) FROM captions_index")?,
        })
    }
}
