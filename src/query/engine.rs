//! Ranked search and autocomplete over the caption index
//!
//! The engine itself is thin: relevance scoring and stem-equivalence are
//! supplied by the index through the `SearchBackend` seam, which keeps the
//! engine testable against a fake. The store-backed implementation lives
//! here too, so no storage code ever reads the index.

use crate::config::SearchConfig;
use crate::error::{CapsearchError, Result};
use crate::storage::Store;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One ranked search match, joined back to its caption and video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Id of the video the caption belongs to
    pub video_id: String,

    /// Caption text with matched term spans wrapped in the marker pair
    pub text: String,

    /// Millisecond offset where the caption appears
    pub start: f64,

    /// Millisecond offset where the caption disappears
    pub end: f64,

    /// Title of the video, or `None` when the caption's `video_id` has no
    /// matching video record (left-join semantics)
    pub video_title: Option<String>,
}

/// Ranked matching capability the engine runs on
///
/// Implementations supply tokenization, stemming, relevance scoring, and
/// highlighting. `Store` is the reference implementation; tests substitute a
/// fake.
pub trait SearchBackend {
    /// Execute `query` against the index and return matches joined to their
    /// caption and video records, best first, with matched spans wrapped in
    /// `open`/`close`
    fn ranked_search(&self, query: &str, open: &str, close: &str) -> Result<Vec<SearchResult>>;

    /// Return up to `limit` raw caption texts matching `query`, best first
    fn ranked_texts(&self, query: &str, limit: u32) -> Result<Vec<String>>;
}

impl<B: SearchBackend> SearchBackend for Arc<B> {
    fn ranked_search(&self, query: &str, open: &str, close: &str) -> Result<Vec<SearchResult>> {
        (**self).ranked_search(query, open, close)
    }

    fn ranked_texts(&self, query: &str, limit: u32) -> Result<Vec<String>> {
        (**self).ranked_texts(query, limit)
    }
}

/// Ranked search with highlighting, joined to captions and videos.
///
/// Ordering is ascending FTS5 rank (best match first) with video id and
/// rowid as tie-breaks, so equal-score results cluster by video and repeat
/// runs return identical order.
const SEARCH_SQL: &str = r#"
WITH hits (rowid, score, marked) AS (
    SELECT rowid, rank, highlight(captions_index, 0, ?2, ?3)
    FROM captions_index
    WHERE captions_index MATCH ?1
)
SELECT c.video_id, h.marked, c.start, c."end", v.title
FROM captions c
JOIN hits h ON h.rowid = c.rowid
LEFT JOIN videos v ON v.id = c.video_id
ORDER BY h.score, c.video_id, c.rowid
"#;

const AUTOCOMPLETE_SQL: &str = r#"
SELECT text
FROM captions_index
WHERE captions_index MATCH ?1
ORDER BY rank
LIMIT ?2
"#;

impl SearchBackend for Store {
    fn ranked_search(&self, query: &str, open: &str, close: &str) -> Result<Vec<SearchResult>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare_cached(SEARCH_SQL)
            .map_err(|e| CapsearchError::Storage(format!("Failed to prepare search: {}", e)))?;

        let rows = stmt
            .query_map(params![query, open, close], |row| {
                Ok(SearchResult {
                    video_id: row.get(0)?,
                    text: row.get(1)?,
                    start: row.get(2)?,
                    end: row.get(3)?,
                    video_title: row.get(4)?,
                })
            })
            .map_err(|e| classify_match_error(query, e))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| classify_match_error(query, e))?);
        }
        Ok(results)
    }

    fn ranked_texts(&self, query: &str, limit: u32) -> Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare_cached(AUTOCOMPLETE_SQL)
            .map_err(|e| CapsearchError::Storage(format!("Failed to prepare autocomplete: {}", e)))?;

        let rows = stmt
            .query_map(params![query, limit], |row| row.get::<_, String>(0))
            .map_err(|e| classify_match_error(query, e))?;

        let mut texts = Vec::new();
        for row in rows {
            texts.push(row.map_err(|e| classify_match_error(query, e))?);
        }
        Ok(texts)
    }
}

/// Distinguish an unparseable MATCH expression from a real storage failure
///
/// FTS5 reports query parse problems as plain SQLITE_ERROR with an
/// explanatory message, which is the only way to tell them apart.
fn classify_match_error(query: &str, err: rusqlite::Error) -> CapsearchError {
    match &err {
        rusqlite::Error::SqliteFailure(_, Some(msg))
            if msg.starts_with("fts5")
                || msg.contains("syntax error")
                || msg.contains("unknown special query")
                || msg.contains("no such column")
                || msg.contains("unterminated string") =>
        {
            log::debug!("Unparseable query {:?}: {}", query, msg);
            CapsearchError::InvalidQuery(query.to_string())
        }
        _ => CapsearchError::Storage(format!("Search query failed: {}", err)),
    }
}

/// Executes search and autocomplete queries against a backend
pub struct QueryEngine<B> {
    backend: B,
    config: SearchConfig,
}

impl<B: SearchBackend> QueryEngine<B> {
    /// Create an engine with default search settings
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, SearchConfig::default())
    }

    /// Create an engine with explicit search settings
    pub fn with_config(backend: B, config: SearchConfig) -> Self {
        Self { backend, config }
    }

    /// Ranked, highlighted full-text search
    ///
    /// An empty (or all-whitespace) query returns no results. A query the
    /// index cannot parse fails with `InvalidQuery`; callers facing end
    /// users are expected to render that as an empty result set.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.backend.ranked_search(
            query,
            &self.config.highlight_open,
            &self.config.highlight_close,
        )?;
        log::debug!("Query {:?} matched {} captions", query, results.len());
        Ok(results)
    }

    /// Up to `autocomplete_limit` raw caption texts matching `prefix`,
    /// ordered by the same relevance ranking as `search`
    ///
    /// Duplicate texts from different segments are preserved.
    pub fn autocomplete(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        self.backend
            .ranked_texts(prefix, self.config.autocomplete_limit)
    }

    /// Get the search settings this engine runs with
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Cue;
    use std::cell::RefCell;

    fn cue(text: &str, start: f64, end: f64) -> Cue {
        Cue {
            text: text.to_string(),
            start,
            end,
        }
    }

    fn store_with_scenario() -> Store {
        let store = Store::memory().unwrap();
        store.create_video("v1", "Cats").unwrap();
        store
            .insert_captions("v1", &[cue("the cat runs fast", 0.0, 1000.0)])
            .unwrap();
        store
    }

    /// Records queries and serves canned responses
    struct FakeBackend {
        queries: RefCell<Vec<String>>,
        results: Vec<SearchResult>,
    }

    impl FakeBackend {
        fn empty() -> Self {
            Self {
                queries: RefCell::new(Vec::new()),
                results: Vec::new(),
            }
        }
    }

    impl SearchBackend for FakeBackend {
        fn ranked_search(&self, query: &str, open: &str, close: &str) -> Result<Vec<SearchResult>> {
            self.queries
                .borrow_mut()
                .push(format!("{}|{}|{}", query, open, close));
            Ok(self.results.clone())
        }

        fn ranked_texts(&self, query: &str, limit: u32) -> Result<Vec<String>> {
            self.queries
                .borrow_mut()
                .push(format!("{}#{}", query, limit));
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_empty_query_short_circuits() {
        let backend = FakeBackend::empty();
        let engine = QueryEngine::new(backend);

        assert!(engine.search("").unwrap().is_empty());
        assert!(engine.search("   ").unwrap().is_empty());
        assert!(engine.autocomplete("").unwrap().is_empty());

        // The backend was never consulted
        assert!(engine.backend.queries.borrow().is_empty());
    }

    #[test]
    fn test_markers_and_limit_come_from_config() {
        let backend = FakeBackend::empty();
        let config = SearchConfig {
            highlight_open: "<mark>".to_string(),
            highlight_close: "</mark>".to_string(),
            autocomplete_limit: 3,
        };
        let engine = QueryEngine::with_config(backend, config);

        engine.search("cat").unwrap();
        engine.autocomplete("cat").unwrap();

        let queries = engine.backend.queries.borrow();
        assert_eq!(queries[0], "cat|<mark>|</mark>");
        assert_eq!(queries[1], "cat#3");
    }

    #[test]
    fn test_stemmed_search_with_highlight() {
        let engine = QueryEngine::new(store_with_scenario());

        let results = engine.search("running").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].video_id, "v1");
        assert_eq!(results[0].text, "the cat <b>runs</b> fast");
        assert_eq!(results[0].video_title, Some("Cats".to_string()));
        assert_eq!(results[0].start, 0.0);
        assert_eq!(results[0].end, 1000.0);
    }

    #[test]
    fn test_orphan_caption_has_null_title() {
        let store = Store::memory().unwrap();
        store
            .insert_captions("v2", &[cue("lonely words here", 0.0, 800.0)])
            .unwrap();
        let engine = QueryEngine::new(store);

        let results = engine.search("lonely").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].video_id, "v2");
        assert_eq!(results[0].video_title, None);
    }

    #[test]
    fn test_unparseable_query_is_invalid_query() {
        let engine = QueryEngine::new(store_with_scenario());

        let err = engine.search("***").unwrap_err();
        assert!(matches!(err, CapsearchError::InvalidQuery(_)));

        let err = engine.search("\"unterminated").unwrap_err();
        assert!(matches!(err, CapsearchError::InvalidQuery(_)));
    }

    #[test]
    fn test_boolean_query_syntax() {
        let store = store_with_scenario();
        store
            .insert_captions("v1", &[cue("the dog walks slowly", 1000.0, 2000.0)])
            .unwrap();
        let engine = QueryEngine::new(store);

        let results = engine.search("cat OR dog").unwrap();
        assert_eq!(results.len(), 2);

        let results = engine.search("cat AND dog").unwrap();
        assert!(results.is_empty());

        let results = engine.search("\"cat runs\"").unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_tied_scores_order_by_video_id() {
        let store = Store::memory().unwrap();
        store.create_video("b", "Second").unwrap();
        store.create_video("a", "First").unwrap();
        // Same text, so identical relevance; inserted in reverse id order
        store
            .insert_captions("b", &[cue("hello world", 0.0, 1000.0)])
            .unwrap();
        store
            .insert_captions("a", &[cue("hello world", 0.0, 1000.0)])
            .unwrap();
        let engine = QueryEngine::new(store);

        let results = engine.search("hello").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].video_id, "a");
        assert_eq!(results[1].video_id, "b");
    }

    #[test]
    fn test_search_is_idempotent() {
        let store = store_with_scenario();
        store
            .insert_captions(
                "v1",
                &[
                    cue("cats and more cats", 1000.0, 2000.0),
                    cue("one cat", 2000.0, 3000.0),
                ],
            )
            .unwrap();
        let engine = QueryEngine::new(store);

        let first = engine.search("cat").unwrap();
        let second = engine.search("cat").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_autocomplete_limit_and_ordering() {
        let store = Store::memory().unwrap();
        store.create_video("v1", "Counting").unwrap();
        let cues: Vec<Cue> = (0..8)
            .map(|i| cue(&format!("counting number {}", i), i as f64 * 1000.0, (i + 1) as f64 * 1000.0))
            .collect();
        store.insert_captions("v1", &cues).unwrap();
        let engine = QueryEngine::new(store);

        let suggestions = engine.autocomplete("counting").unwrap();
        assert_eq!(suggestions.len(), 5);
        // Raw caption text, no markers
        assert!(suggestions[0].starts_with("counting number"));
        assert!(!suggestions[0].contains("<b>"));
    }

    #[test]
    fn test_autocomplete_keeps_duplicates() {
        let store = Store::memory().unwrap();
        store.create_video("v1", "Echo").unwrap();
        store
            .insert_captions(
                "v1",
                &[cue("repeat after me", 0.0, 1000.0), cue("repeat after me", 1000.0, 2000.0)],
            )
            .unwrap();
        let engine = QueryEngine::new(store);

        let suggestions = engine.autocomplete("repeat").unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0], suggestions[1]);
    }

    #[test]
    fn test_engine_over_shared_store() {
        let store = Arc::new(store_with_scenario());
        let engine = QueryEngine::new(Arc::clone(&store));

        let results = engine.search("cat").unwrap();
        assert_eq!(results.len(), 1);
    }
}
