//! Upsert-to-table sink backed by SQLite.
//!
//! `INSERT OR IGNORE` keyed on the article id makes commits idempotent; the
//! reported count is rows actually inserted, which can be smaller than the
//! offered batch when articles are re-delivered after a crash. The articles
//! table is also the watermark source of truth for SQLite deployments:
//! [`SqliteSink::max_id`] replaces the watermark file entirely.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::{info, instrument};

use crate::error::Error;
use crate::models::Article;
use crate::sinks::Sink;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS articles (
    id          INTEGER PRIMARY KEY,
    title       TEXT NOT NULL,
    link        TEXT NOT NULL,
    date        TEXT NOT NULL,
    category    TEXT NOT NULL,
    scraped_at  TEXT NOT NULL
)";

/// SQLite-backed article store.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, Error> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.execute(SCHEMA, [])?;
        Ok(Self { conn })
    }

    /// Highest committed article id, 0 on an empty table. This is the derived
    /// watermark for SQLite deployments.
    pub fn max_id(&self) -> Result<u64, Error> {
        let max: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(id), 0) FROM articles", [], |row| {
                row.get(0)
            })?;
        Ok(max as u64)
    }

    /// Number of stored articles.
    pub fn count(&self) -> Result<u64, Error> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

#[async_trait]
impl Sink for SqliteSink {
    #[instrument(level = "info", skip_all)]
    async fn commit(&mut self, articles: &[Article]) -> Result<usize, Error> {
        let scraped_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO articles (id, title, link, date, category, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for article in articles {
                inserted += stmt.execute(params![
                    article.id as i64,
                    article.title,
                    article.link,
                    article.date,
                    article.category,
                    scraped_at,
                ])?;
            }
        }
        tx.commit()?;
        info!(offered = articles.len(), inserted, "Committed to SQLite");
        Ok(inserted)
    }
}
