// src/police/mod.rs
//
// Daily police incident counts, scraped from a reverse-chronological paginated
// listing (page 0 is newest, rows inside a page are newest first).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::DownloadError;
use crate::fetch::RawTable;

pub mod downloader;
pub mod locate;
pub mod range;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use downloader::PoliceDataDownloader;
pub use source::HttpPages;

pub const DATE_COLUMN: &str = "Data";
pub const ACCIDENTS_COLUMN: &str = "Wypadki drogowe";
pub const DEATHS_COLUMN: &str = "Zabici w wypadkach";
pub const INJURIES_COLUMN: &str = "Ranni w wypadkach";

/// One day of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliceRecord {
    #[serde(rename = "Data")]
    pub date: NaiveDate,
    #[serde(rename = "Wypadki drogowe")]
    pub accidents: Option<u32>,
    #[serde(rename = "Zabici w wypadkach")]
    pub deaths: Option<u32>,
    #[serde(rename = "Ranni w wypadkach")]
    pub injuries: Option<u32>,
}

impl PoliceRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// An exact row inside one listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRef {
    pub page: u32,
    pub row: usize,
}

impl PageRef {
    pub fn new(page: u32, row: usize) -> Self {
        Self { page, row }
    }
}

/// Where listing pages come from.
///
/// `Ok` with an empty batch means the listing has no such page (ran past the
/// end). Soft failures come back as `DownloadError::FetchFailure`.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<PoliceRecord>, DownloadError>;
}

/// All records of one year, ascending by date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    year: i32,
    records: Vec<PoliceRecord>,
}

impl ResultSet {
    /// Concatenate page batches (fetched newest page first) and sort once.
    pub fn from_batches(year: i32, batches: Vec<Vec<PoliceRecord>>) -> Self {
        let mut records: Vec<PoliceRecord> = batches.into_iter().flatten().collect();
        records.sort_by_key(|r| r.date);
        Self { year, records }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn records(&self) -> &[PoliceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PoliceRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turn a scraped listing table into records, keeping the table's row order.
///
/// A renamed or missing column and a malformed date are hard errors: the
/// listing layout changed and guessing would produce silently wrong data.
pub fn records_from_table(table: &RawTable, url: &str) -> Result<Vec<PoliceRecord>, DownloadError> {
    let col = |name: &str| {
        table.column(name).ok_or_else(|| DownloadError::MissingColumn {
            column: name.to_string(),
            url: url.to_string(),
        })
    };
    let date_idx = col(DATE_COLUMN)?;
    let counters = [
        (ACCIDENTS_COLUMN, col(ACCIDENTS_COLUMN)?),
        (DEATHS_COLUMN, col(DEATHS_COLUMN)?),
        (INJURIES_COLUMN, col(INJURIES_COLUMN)?),
    ];

    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");

        let raw_date = cell(date_idx);
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|source| {
            DownloadError::MalformedDate {
                value: raw_date.to_string(),
                url: url.to_string(),
                source,
            }
        })?;

        let mut values = [None; 3];
        for (slot, (name, idx)) in values.iter_mut().zip(counters) {
            *slot = parse_counter(cell(idx)).map_err(|_| DownloadError::MalformedValue {
                column: name.to_string(),
                value: cell(idx).to_string(),
                url: url.to_string(),
            })?;
        }
        let [accidents, deaths, injuries] = values;

        out.push(PoliceRecord {
            date,
            accidents,
            deaths,
            injuries,
        });
    }
    Ok(out)
}

/// Blank and `-` cells are missing values; thousands may be space separated.
fn parse_counter(raw: &str) -> Result<Option<u32>, std::num::ParseIntError> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() || digits == "-" {
        return Ok(None);
    }
    digits.parse().map(Some)
}
