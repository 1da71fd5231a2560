//! Normalization of raw rows into [`Article`] records.
//!
//! Resolves relative links against the site base URL, derives the numeric
//! article id from the link's `id=` query parameter, and cleans up the title
//! and date text. Rows without a derivable id are rejected, since they cannot be
//! deduplicated or ordered, so persisting them would poison the watermark.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::models::{Article, RawRow};

static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"id=(\d+)").unwrap());

/// First integer following an `id=` marker in the link, if any.
pub fn extract_id(link: &str) -> Option<u64> {
    ID_RE
        .captures(link)
        .and_then(|caps| caps[1].parse::<u64>().ok())
}

/// Absolute links pass through; relative hrefs are joined onto the base URL.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    base.join(href).ok().map(|u| u.to_string())
}

/// Trim whitespace and any enclosing parenthesis characters from a date label.
pub fn clean_date(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '(' || c == ')')
        .trim()
        .to_string()
}

/// Turn a raw row into an [`Article`], or reject it.
///
/// An empty title is accepted; a missing id is not.
pub fn normalize_row(row: &RawRow, category: &str, base: &Url) -> Option<Article> {
    let Some(link) = resolve_link(base, &row.href) else {
        debug!(href = %row.href, "Unresolvable link; rejecting row");
        return None;
    };
    let Some(id) = extract_id(&link) else {
        debug!(%link, "Link carries no article id; rejecting row");
        return None;
    };
    Some(Article {
        id,
        title: row.title.trim().to_string(),
        link,
        date: clean_date(&row.date),
        category: category.to_string(),
    })
}
