//! The incremental fetch-and-deduplicate run loop.
//!
//! One run walks the configured categories in order, sequentially:
//! fetch → extract → normalize → filter against the watermark. Everything that
//! survives is committed to the sink in a single batch, and only then may the
//! caller advance the watermark, so a crash between fetch and commit therefore
//! never moves the watermark past unpersisted data. Sinks absorb the resulting
//! at-least-once re-deliveries with their insert-or-ignore semantics.
//!
//! Every row is tested against the watermark independently. The upstream
//! tables usually look sorted newest-first, but that ordering is not
//! guaranteed, so there is no early exit on the first old id.

use tracing::{info, instrument, warn};
use url::Url;

use crate::config::{Category, SiteConfig};
use crate::error::Error;
use crate::extract;
use crate::fetch::{FetchError, Fetcher};
use crate::models::{Article, CategoryOutcome, RunReport};
use crate::normalize;
use crate::sinks::Sink;

/// Run the whole pipeline once against the given sink.
///
/// Fetch failures are per-category: they are recorded as
/// [`CategoryOutcome::Skipped`] and the loop continues. Only configuration and
/// sink trouble fail the run as a whole.
pub async fn run(
    config: &SiteConfig,
    fetcher: &Fetcher,
    sink: &mut dyn Sink,
    watermark_before: u64,
) -> Result<RunReport, Error> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| Error::Config(format!("invalid base_url {:?}: {e}", config.base_url)))?;

    let mut outcomes = Vec::with_capacity(config.categories.len());
    let mut accepted: Vec<Article> = Vec::new();
    let mut max_seen = watermark_before;

    for category in &config.categories {
        match process_category(fetcher, category, &base, watermark_before).await {
            Ok((rows, fresh, category_max)) => {
                max_seen = max_seen.max(category_max);
                outcomes.push(CategoryOutcome::Fetched {
                    category: category.label.clone(),
                    rows,
                    accepted: fresh.len(),
                });
                accepted.extend(fresh);
            }
            Err(e) => {
                warn!(category = %category.label, error = %e, "Skipping category");
                outcomes.push(CategoryOutcome::Skipped {
                    category: category.label.clone(),
                    reason: e.into(),
                });
            }
        }
    }

    info!(
        accepted = accepted.len(),
        max_seen, "Committing accepted articles"
    );
    let committed = sink.commit(&accepted).await?;

    Ok(RunReport {
        outcomes,
        accepted: accepted.len(),
        committed,
        watermark_before,
        watermark_after: max_seen,
    })
}

/// Fetch and process one category.
///
/// Returns the raw row count, the articles past the watermark, and the highest
/// id seen (old or new; the watermark only ever moves forward).
#[instrument(level = "info", skip_all, fields(category = %category.label))]
async fn process_category(
    fetcher: &Fetcher,
    category: &Category,
    base: &Url,
    watermark: u64,
) -> Result<(usize, Vec<Article>, u64), FetchError> {
    let body = fetcher.fetch_category(category).await?;
    let rows = extract::extract_rows(&body);

    let mut fresh = Vec::new();
    let mut max_seen = watermark;
    for row in &rows {
        let Some(article) = normalize::normalize_row(row, &category.label, base) else {
            continue;
        };
        max_seen = max_seen.max(article.id);
        if article.id > watermark {
            fresh.push(article);
        }
    }

    info!(rows = rows.len(), accepted = fresh.len(), "Processed category");
    Ok((rows.len(), fresh, max_seen))
}
