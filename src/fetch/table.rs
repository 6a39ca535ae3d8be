// src/fetch/table.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid row selector"));
static CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("valid cell selector"));
static DATA_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid td selector"));

/// An HTML table flattened to trimmed cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Header cells, from `<thead>` or the first all-`<th>` row.
    pub headers: Vec<String>,
    /// Every row holding at least one `<td>`, in document order.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Extract the first table matching `selector`, or `None` if the page has none.
pub fn parse_table(html: &str, selector: &Selector) -> Option<RawTable> {
    let doc = Html::parse_document(html);
    let table = doc.select(selector).next()?;

    let mut headers = Vec::new();
    let mut rows = Vec::new();
    for tr in table.select(&ROW) {
        let cells: Vec<String> = tr.select(&CELL).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        let has_data = tr.select(&DATA_CELL).next().is_some();
        if headers.is_empty() && (in_thead(&tr) || !has_data) {
            headers = cells;
        } else if has_data {
            rows.push(cells);
        }
    }

    Some(RawTable { headers, rows })
}

fn in_thead(tr: &ElementRef<'_>) -> bool {
    tr.parent()
        .and_then(ElementRef::wrap)
        .map(|p| p.value().name() == "thead")
        .unwrap_or(false)
}

/// Collapse inner whitespace (`char::is_whitespace` covers `&nbsp;`).
fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(|t| t.split(char::is_whitespace))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
