//! HTTP fetcher for the announcements endpoint.
//!
//! One [`Fetcher`] is built per run and reuses a single `reqwest::Client`
//! (connection pooling plus a consistent browser-like identity). Each category
//! costs exactly one form-encoded POST; there are no retries: a failed
//! category is reported back as a [`FetchError`] and the run loop moves on.

use std::time::Duration;

use reqwest::header;
use tracing::{debug, instrument};

use crate::config::{Category, SiteConfig};
use crate::error::Error;
use crate::models::SkipReason;

/// A single category fetch gone wrong. Recovered by the run loop, never fatal.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The server answered, but not with success.
    #[error("request failed with status {0}")]
    Status(u16),
    /// The request itself failed (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<FetchError> for SkipReason {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status(status) => SkipReason::HttpStatus(status),
            FetchError::Transport(e) => SkipReason::Transport(e.to_string()),
        }
    }
}

/// HTTP session for the announcements endpoint.
pub struct Fetcher {
    client: reqwest::Client,
    articles_url: String,
    referer: String,
}

impl Fetcher {
    /// Build the reusable client: configured User-Agent, 30 s request timeout.
    pub fn new(config: &SiteConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            articles_url: config.articles_url.clone(),
            referer: config.referer.clone(),
        })
    }

    /// POST the category's form value and return the raw HTML body.
    ///
    /// `Content-Type: application/x-www-form-urlencoded` is set by `.form()`;
    /// the Referer points at the public articles page, which the site checks.
    #[instrument(level = "info", skip_all, fields(category = %category.label))]
    pub async fn fetch_category(&self, category: &Category) -> Result<String, FetchError> {
        let response = self
            .client
            .post(&self.articles_url)
            .header(header::ACCEPT, "*/*")
            .header(header::REFERER, &self.referer)
            .form(&[("category", category.value.as_str())])
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Fetched category page");
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
