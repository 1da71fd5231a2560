//! Bulk-index sink: JSON document store plus a search-index upload.
//!
//! Wraps [`JsonSink`] for durability and, after each commit, POSTs the full
//! accumulated collection to the index's batch document endpoint
//! (`/indexes/<name>/documents`, Meilisearch-style). The service acknowledges
//! with an asynchronous task id rather than indexing immediately. A rejected
//! or unreachable index is logged and NOT fatal: the document store is already
//! committed, and the next run re-uploads the whole collection anyway.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::error::Error;
use crate::models::Article;
use crate::sinks::{JsonSink, Sink};
use crate::utils::truncate_for_log;

/// JSON store + search index upload.
pub struct SearchIndexSink {
    store: JsonSink,
    index_url: String,
    index_name: String,
    client: reqwest::Client,
}

impl SearchIndexSink {
    pub fn new(store_path: impl Into<PathBuf>, index_url: String, index_name: String) -> Self {
        Self {
            store: JsonSink::new(store_path),
            index_url,
            index_name,
            client: reqwest::Client::new(),
        }
    }

    async fn upload(&self, documents: &[Article]) {
        let url = format!(
            "{}/indexes/{}/documents",
            self.index_url.trim_end_matches('/'),
            self.index_name
        );
        let response = match self.client.post(&url).json(documents).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "Failed to reach search index");
                return;
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            let task_uid = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("taskUid").cloned());
            info!(
                count = documents.len(),
                task_uid = ?task_uid,
                "Submitted documents to search index"
            );
        } else {
            warn!(
                status = status.as_u16(),
                body = %truncate_for_log(&body, 300),
                "Search index rejected document batch"
            );
        }
    }
}

#[async_trait]
impl Sink for SearchIndexSink {
    #[instrument(level = "info", skip_all, fields(index = %self.index_name))]
    async fn commit(&mut self, articles: &[Article]) -> Result<usize, Error> {
        let added = self.store.commit(articles).await?;
        let documents = self.store.load().await;
        self.upload(&documents).await;
        Ok(added)
    }
}
