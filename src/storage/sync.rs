//! Caption index synchronization
//!
//! The `captions_index` table is derived data: one entry per caption row,
//! keyed by that row's rowid and holding the tokenized form of its text.
//! These three propagation rules mirror the caption mutations one-to-one and
//! must run inside the same transaction as the row write, so no reader ever
//! observes the captions table and the index disagreeing. All writes to
//! `captions_index` in this crate go through here.

use rusqlite::{Transaction, params};

/// Propagate a caption insert: add the index entry for `rowid`
pub(crate) fn on_insert(tx: &Transaction, rowid: i64, text: &str) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO captions_index (rowid, text) VALUES (?1, ?2)",
        params![rowid, text],
    )?;
    Ok(())
}

/// Propagate a caption text update: replace the tokens for `rowid` in place
pub(crate) fn on_update(tx: &Transaction, rowid: i64, new_text: &str) -> rusqlite::Result<()> {
    tx.execute(
        "UPDATE captions_index SET text = ?2 WHERE rowid = ?1",
        params![rowid, new_text],
    )?;
    Ok(())
}

/// Propagate a caption delete: remove the index entry for `rowid`
pub(crate) fn on_delete(tx: &Transaction, rowid: i64) -> rusqlite::Result<()> {
    tx.execute("DELETE FROM captions_index WHERE rowid = ?1", params![rowid])?;
    Ok(())
}

/// Re-derive the entire index from the captions table
///
/// The index is disposable; this is the recovery path when it is missing or
/// suspect. Returns the number of entries written.
pub(crate) fn rebuild(tx: &Transaction) -> rusqlite::Result<usize> {
    tx.execute("DELETE FROM captions_index", [])?;
    let written = tx.execute(
        "INSERT INTO captions_index (rowid, text) SELECT rowid, text FROM captions",
        [],
    )?;
    Ok(written)
}
