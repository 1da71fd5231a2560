//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Sink selection picks the persistence backend; everything else is paths and
//! the search-index endpoint.

use clap::{Parser, ValueEnum};

/// Which persistence backend a deployment uses.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkKind {
    /// Append to a JSON array file (`news_data.json`).
    Json,
    /// Insert-or-ignore into a SQLite `articles` table (`news.db`).
    Sqlite,
    /// JSON file plus bulk upload to a search index.
    Search,
}

/// Command-line arguments for the announcements sync job.
///
/// # Examples
///
/// ```sh
/// # JSON store in ./data (the default)
/// dit_news_sync
///
/// # SQLite deployment with a custom data directory
/// dit_news_sync -d /var/lib/dit-news -s sqlite
///
/// # Publish to a Meilisearch-style index
/// dit_news_sync -s search --index-url http://localhost:7700 --index-name news
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding the JSON store, watermark file, and SQLite database
    #[arg(short, long, default_value = "./data")]
    pub data_dir: String,

    /// Persistence backend for accepted articles
    #[arg(short, long, value_enum, default_value = "json")]
    pub sink: SinkKind,

    /// Optional path to a site config YAML file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Search index base URL (search sink only)
    #[arg(long, env = "INDEX_URL", default_value = "http://localhost:7700")]
    pub index_url: String,

    /// Search index name (search sink only)
    #[arg(long, env = "INDEX_NAME", default_value = "news")]
    pub index_name: String,
}
