//! Data models for scraped announcements and per-run reporting.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`RawRow`]: An unprocessed (title, href, date) triple out of the row extractor
//! - [`Article`]: A normalized announcement record, ready for persistence
//! - [`CategoryOutcome`]: The explicit per-category result of a run
//! - [`RunReport`]: The aggregate of one full pipeline invocation

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw table row as paired up by the extractor.
///
/// Fields are untrimmed text straight out of the markup; the normalizer is
/// responsible for cleaning them and deriving the article id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Link text of the title cell.
    pub title: String,
    /// The `href` attribute of the title link, possibly relative.
    pub href: String,
    /// Text of the date cell, often wrapped in parentheses.
    pub date: String,
}

/// A normalized announcement article.
///
/// Immutable once created. The `id` comes from the `id=` query parameter of
/// the article link and uniquely identifies an article across all categories
/// and runs; sinks enforce that uniqueness with insert-or-ignore semantics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Site-wide unique article id.
    pub id: u64,
    /// Trimmed title text; may be empty.
    pub title: String,
    /// Absolute URL of the article page.
    pub link: String,
    /// Free-text date label, stripped of whitespace and enclosing parentheses.
    pub date: String,
    /// Label of the category the article was listed under.
    pub category: String,
}

/// Why a category produced no articles this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The server answered with a non-success status code.
    HttpStatus(u16),
    /// The request never completed (connection failure, timeout, bad body).
    Transport(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::HttpStatus(status) => write!(f, "HTTP status {status}"),
            SkipReason::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

/// Per-category result of a run.
///
/// A category that fetched fine but contained no results table (or no rows)
/// is still `Fetched` with `rows: 0`; only transport-level trouble skips a
/// category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    Fetched {
        category: String,
        /// Raw rows the extractor paired up.
        rows: usize,
        /// Articles past the watermark, handed to the sink.
        accepted: usize,
    },
    Skipped {
        category: String,
        reason: SkipReason,
    },
}

impl CategoryOutcome {
    pub fn category(&self) -> &str {
        match self {
            CategoryOutcome::Fetched { category, .. } => category,
            CategoryOutcome::Skipped { category, .. } => category,
        }
    }
}

/// Aggregate of one pipeline invocation.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<CategoryOutcome>,
    /// Total articles accepted past the watermark across all categories.
    pub accepted: usize,
    /// Articles the sink actually newly persisted (≤ `accepted`).
    pub committed: usize,
    pub watermark_before: u64,
    pub watermark_after: u64,
}

impl RunReport {
    /// Number of categories that were skipped because of fetch failures.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CategoryOutcome::Skipped { .. }))
            .count()
    }
}
