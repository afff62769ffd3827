//! Timed-text caption track parsing
//!
//! Caption tracks arrive as timed-text markup: a flat sequence of `<text>`
//! elements carrying `start` and `dur` attributes in seconds, with
//! HTML-entity-encoded content. Parsing goes through html5ever (via
//! `scraper`), which decodes entities while building the tree, so cue text
//! comes out human-readable.

use crate::error::{CapsearchError, Result};
use crate::storage::Cue;
use scraper::{Html, Selector};

/// Parse a timed-text document into caption cues
///
/// Offsets are converted to milliseconds; `end` is `start + dur`. A cue
/// with an unparseable `start` is skipped with a warning, and a missing
/// `dur` yields a zero-length cue. Elements with no text at all are
/// dropped.
pub fn parse_timedtext(markup: &str) -> Result<Vec<Cue>> {
    let document = Html::parse_document(markup);
    let selector = Selector::parse("text")
        .map_err(|e| CapsearchError::TimedText(format!("Bad cue selector: {}", e)))?;

    let mut cues = Vec::new();
    for element in document.select(&selector) {
        let text: String = element.text().collect();
        if text.trim().is_empty() {
            continue;
        }

        let start_secs = match element.value().attr("start").and_then(|s| s.parse::<f64>().ok()) {
            Some(s) => s,
            None => {
                log::warn!("Skipping cue with missing or unparseable start: {:?}", text);
                continue;
            }
        };
        let dur_secs = element
            .value()
            .attr("dur")
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);

        let start = start_secs * 1000.0;
        cues.push(Cue {
            text,
            start,
            end: start + dur_secs * 1000.0,
        });
    }

    if cues.is_empty() {
        log::warn!("Timed-text document produced no cues");
    }
    Ok(cues)
}
