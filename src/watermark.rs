//! File-backed watermark store.
//!
//! The watermark is the highest article id ever committed to the sink, one
//! integer for the whole deployment. JSON and search-index deployments keep it
//! in a plain-text file; SQLite deployments derive it from the articles table
//! instead (see [`crate::sinks::SqliteSink::max_id`]) and never touch this
//! store. One source of truth per deployment.

use std::path::PathBuf;

use tokio::fs;
use tracing::{info, warn};

/// Plain-text integer file, written with an atomic replace.
pub struct FileWatermark {
    path: PathBuf,
}

impl FileWatermark {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored watermark. Missing or unparseable content starts the
    /// deployment fresh at 0 rather than failing the run.
    pub async fn read(&self) -> u64 {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(value) => value,
                Err(_) => {
                    warn!(path = %self.path.display(), "Watermark file is unreadable; starting from 0");
                    0
                }
            },
            Err(_) => {
                info!(path = %self.path.display(), "No watermark file; starting fresh");
                0
            }
        }
    }

    /// Write the watermark via temp file + rename so a crash mid-write never
    /// leaves a torn value.
    pub async fn write(&self, value: u64) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, value.to_string()).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
