//! # DIT News Sync
//!
//! A batch job that scrapes the announcements site of the Dept. of
//! Informatics & Telecommunications (University of Ioannina), detects
//! articles newer than the remembered high-water mark, and persists them to
//! a JSON store, a SQLite table, or a search index.
//!
//! ## Usage
//!
//! ```sh
//! dit_news_sync -d ./data -s sqlite
//! ```
//!
//! ## Architecture
//!
//! One sequential pass per invocation:
//! 1. **Fetch**: one form-encoded POST per configured category
//! 2. **Extract**: pair (title, date) cells out of the results table
//! 3. **Normalize**: absolute links, numeric ids, clean date labels
//! 4. **Filter**: keep only ids above the watermark
//! 5. **Commit**: sink write first, watermark advance strictly after
//!
//! ## Exit codes
//!
//! `0` ran with zero errors; `1` completed, but some categories were
//! skipped; `2` run-level failure (config, sink, or watermark write).

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use dit_news_sync::cli::{Cli, SinkKind};
use dit_news_sync::error::Error;
use dit_news_sync::fetch::Fetcher;
use dit_news_sync::models::{CategoryOutcome, RunReport};
use dit_news_sync::sinks::{JsonSink, SearchIndexSink, Sink, SqliteSink};
use dit_news_sync::utils::ensure_writable_dir;
use dit_news_sync::watermark::FileWatermark;
use dit_news_sync::{config, pipeline};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_sync starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let report = match run(&args).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Run failed");
            return ExitCode::from(2);
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        accepted = report.accepted,
        committed = report.committed,
        watermark_before = report.watermark_before,
        watermark_after = report.watermark_after,
        skipped_categories = report.skipped(),
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Run complete"
    );

    if report.skipped() > 0 {
        for outcome in &report.outcomes {
            if let CategoryOutcome::Skipped { category, reason } = outcome {
                warn!(category = %category, reason = %reason, "Category was skipped this run");
            }
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run(args: &Cli) -> Result<RunReport, Error> {
    let config = config::load(args.config.as_deref()).await?;
    ensure_writable_dir(&args.data_dir).await?;

    let fetcher = Fetcher::new(&config)?;
    let data_dir = Path::new(&args.data_dir);
    let json_path = data_dir.join("news_data.json");

    // Each deployment has exactly one watermark source of truth: the file for
    // document-store sinks, MAX(id) over the table for SQLite.
    let (mut sink, file_watermark, watermark_before): (Box<dyn Sink>, Option<FileWatermark>, u64) =
        match args.sink {
            SinkKind::Json => {
                let wm = FileWatermark::new(data_dir.join("latest_id.txt"));
                let before = wm.read().await;
                (Box::new(JsonSink::new(json_path)), Some(wm), before)
            }
            SinkKind::Search => {
                let wm = FileWatermark::new(data_dir.join("latest_id.txt"));
                let before = wm.read().await;
                let sink = SearchIndexSink::new(
                    json_path,
                    args.index_url.clone(),
                    args.index_name.clone(),
                );
                (Box::new(sink), Some(wm), before)
            }
            SinkKind::Sqlite => {
                let sink = SqliteSink::open(data_dir.join("news.db"))?;
                let before = sink.max_id()?;
                (Box::new(sink), None, before)
            }
        };
    info!(watermark = watermark_before, sink = ?args.sink, "Loaded watermark");

    let report = pipeline::run(&config, &fetcher, sink.as_mut(), watermark_before).await?;

    // Strictly after the sink commit. The derived SQLite watermark needs no
    // write at all.
    if let Some(wm) = file_watermark {
        wm.write(report.watermark_after).await?;
    }

    Ok(report)
}
