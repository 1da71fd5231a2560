//! Persistence sinks for accepted articles.
//!
//! Three interchangeable backends behind one [`Sink`] trait; a deployment
//! picks exactly one:
//!
//! - [`json::JsonSink`]: append to a JSON array document on disk
//! - [`sqlite::SqliteSink`]: insert-or-ignore into an `articles` table
//! - [`search::SearchIndexSink`]: JSON store plus a bulk upload to a search
//!   index's document endpoint
//!
//! All three absorb re-delivered articles without duplication, which is what
//! makes the pipeline's at-least-once delivery safe: a crash before the
//! watermark write only means already-saved articles get offered again.

use async_trait::async_trait;

use crate::error::Error;
use crate::models::Article;

pub mod json;
pub mod search;
pub mod sqlite;

pub use json::JsonSink;
pub use search::SearchIndexSink;
pub use sqlite::SqliteSink;

/// A persistence target for accepted articles.
#[async_trait]
pub trait Sink {
    /// Persist the batch. Returns how many articles were actually newly
    /// stored; re-offered ids that the sink already holds don't count.
    async fn commit(&mut self, articles: &[Article]) -> Result<usize, Error>;
}
