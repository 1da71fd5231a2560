//! Append-to-document sink: one JSON array file holding every article.
//!
//! The whole collection is read, extended, and written back on each commit.
//! Output is pretty-printed UTF-8 with non-ASCII characters preserved
//! literally, so the file stays greppable for the Greek titles.

use std::path::PathBuf;

use async_trait::async_trait;
use itertools::Itertools;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::Error;
use crate::models::Article;
use crate::sinks::Sink;

/// JSON array document on disk.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the current collection. A missing or unparseable file starts the
    /// collection empty; losing a corrupt store to a fresh scrape beats
    /// aborting every future run.
    pub async fn load(&self) -> Vec<Article> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => {
                info!(path = %self.path.display(), "No existing article store; starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(articles) => articles,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Article store is unparseable; starting empty");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Sink for JsonSink {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn commit(&mut self, articles: &[Article]) -> Result<usize, Error> {
        let existing = self.load().await;
        let before = existing.len();

        // first occurrence wins, so stored articles are never overwritten
        let merged: Vec<Article> = existing
            .into_iter()
            .chain(articles.iter().cloned())
            .unique_by(|a| a.id)
            .collect();
        let added = merged.len().saturating_sub(before);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&merged)?;
        fs::write(&self.path, json).await?;

        info!(added, total = merged.len(), "Wrote article store");
        Ok(added)
    }
}
