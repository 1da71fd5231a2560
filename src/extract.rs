//! Row extraction from the announcements table markup.
//!
//! The upstream markup is not reliably well-formed: `<tr>` boundaries are
//! sometimes missing or mangled, so extraction cannot lean on row grouping.
//! Instead the extractor works at the level of `<td>` cells in document order
//! and pairs them heuristically:
//!
//! - a cell carrying a `colspan` attribute is a header/spanning marker, so skip it;
//! - a cell containing an `<a href>` is a title cell, and the cell immediately
//!   after it is taken as its date cell; emit the pair and advance two cells;
//! - anything else advances one cell.
//!
//! A title cell with no following cell is dropped. A missing table or an empty
//! table yields an empty result with a diagnostic log; extraction never fails.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::models::RawRow;

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.table.table-striped").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Extract (title, href, date) triples from one category's HTML response.
pub fn extract_rows(html: &str) -> Vec<RawRow> {
    let document = Html::parse_document(html);
    let Some(table) = document.select(&TABLE_SELECTOR).next() else {
        warn!("No results table in response");
        return Vec::new();
    };

    let cells: Vec<ElementRef> = table.select(&CELL_SELECTOR).collect();
    let mut rows = Vec::new();
    let mut i = 0;
    while i < cells.len() {
        let cell = cells[i];
        if cell.value().attr("colspan").is_some() {
            i += 1;
            continue;
        }
        let Some(link) = cell.select(&LINK_SELECTOR).next() else {
            i += 1;
            continue;
        };
        let Some(date_cell) = cells.get(i + 1) else {
            // title cell at the very end of the table
            debug!("Title cell without a date cell; dropping row");
            break;
        };
        rows.push(RawRow {
            title: link.text().collect::<String>(),
            href: link.value().attr("href").unwrap_or_default().to_string(),
            date: date_cell.text().collect::<String>(),
        });
        i += 2;
    }
    debug!(rows = rows.len(), cells = cells.len(), "Extracted rows");
    rows
}
