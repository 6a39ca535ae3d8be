// src/holidays/mod.rs

use anyhow::Result;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::HolidaysConfig;
use crate::downloader::{check_year, Downloader};
use crate::error::DownloadError;
use crate::fetch::{fill_template, selector, HttpFetcher, RawTable};

const DATE_COLUMN: &str = "Date";
const NAME_COLUMN: &str = "Name";

static DAY_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\.?\s+(\p{L}+)").expect("valid day/month regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Month number for a Polish (`sty`, `paź`, ...) or English (`Jan`, ...)
/// three-letter abbreviation. Longer names are cut to three letters first.
pub fn month_from_abbrev(word: &str) -> Option<u32> {
    let abbrev: String = word.chars().take(3).flat_map(char::to_lowercase).collect();
    let m = match abbrev.as_str() {
        "sty" | "jan" => 1,
        "lut" | "feb" => 2,
        "mar" => 3,
        "kwi" | "apr" => 4,
        "maj" | "may" => 5,
        "cze" | "jun" => 6,
        "lip" | "jul" => 7,
        "sie" | "aug" => 8,
        "wrz" | "sep" => 9,
        "paź" | "paz" | "oct" => 10,
        "lis" | "nov" => 11,
        "gru" | "dec" => 12,
        _ => return None,
    };
    Some(m)
}

/// `"1 sty"` + 2023 → 2023-01-01.
pub fn parse_day_month(cell: &str, year: i32) -> Option<NaiveDate> {
    let caps = DAY_MONTH.captures(cell.trim())?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_from_abbrev(&caps[2])?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Rows whose date cell is not a day + month (section headings, notes) are
/// skipped.
pub fn holidays_from_table(
    table: &RawTable,
    year: i32,
    url: &str,
) -> Result<Vec<Holiday>, DownloadError> {
    let col = |name: &str| {
        table.column(name).ok_or_else(|| DownloadError::MissingColumn {
            column: name.to_string(),
            url: url.to_string(),
        })
    };
    let (date_idx, name_idx) = (col(DATE_COLUMN)?, col(NAME_COLUMN)?);

    let mut out = Vec::new();
    for row in &table.rows {
        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
        match parse_day_month(cell(date_idx), year) {
            Some(date) => out.push(Holiday {
                date,
                name: cell(name_idx).to_string(),
            }),
            None => debug!(row = ?row, "skipping row without a date"),
        }
    }
    out.sort_by_key(|h| h.date);
    Ok(out)
}

pub struct HolidaysDownloader {
    fetcher: HttpFetcher,
    url_template: String,
    table: Selector,
}

impl HolidaysDownloader {
    pub fn new(fetcher: HttpFetcher, cfg: &HolidaysConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            url_template: cfg.url_template.clone(),
            table: selector(&cfg.table_selector)?,
        })
    }
}

impl Downloader for HolidaysDownloader {
    type Output = Vec<Holiday>;
    const NAME: &'static str = "holidays";

    #[instrument(level = "info", skip(self))]
    async fn download(&self, year: i32) -> Result<Vec<Holiday>, DownloadError> {
        check_year(year)?;
        let raw = fill_template(&self.url_template, year, None);
        let url = Url::parse(&raw).map_err(|e| DownloadError::fetch(&raw, e))?;

        let table = self.fetcher.fetch_table(&url, &self.table).await?;
        let holidays = holidays_from_table(&table, year, url.as_str())?;
        if holidays.is_empty() {
            return Err(DownloadError::fetch(url, "no holidays in table"));
        }
        info!(year, count = holidays.len(), "holidays downloaded");
        Ok(holidays)
    }
}
