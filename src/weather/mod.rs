// src/weather/mod.rs

use chrono::{Datelike, Local, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::WeatherConfig;
use crate::downloader::{check_year, Downloader};
use crate::error::DownloadError;
use crate::fetch::{fill_template, zips::fetch_zip_texts, HttpFetcher};

// Column positions in the headerless k_d_*.csv files.
const STATION_NAME: usize = 1;
const YEAR: usize = 2;
const MONTH: usize = 3;
const DAY: usize = 4;
const STD_TEMP: usize = 9;
const PRECIP_SUM: usize = 13;
const PRECIP_TYPE: usize = 15;

const NO_PRECIP: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Std Temp")]
    pub std_temp: Option<f64>,
    #[serde(rename = "Precip Sum")]
    pub precip_sum: Option<f64>,
    #[serde(rename = "Precip Type")]
    pub precip_type: String,
}

/// Daily climate files; `k_d_t_*` carries the auxiliary temperature set.
pub fn is_daily_file(name: &str) -> bool {
    name.starts_with("k_d_") && !name.starts_with("k_d_t_") && name.ends_with(".csv")
}

/// Parse one daily climate file, keeping only `station`'s rows.
pub fn parse_daily_csv(
    text: &str,
    station: &str,
    file: &str,
) -> Result<Vec<WeatherRecord>, DownloadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.get(STATION_NAME).map(str::trim) != Some(station) {
            continue;
        }
        out.push(weather_record(&record, file)?);
    }
    Ok(out)
}

fn weather_record(record: &StringRecord, file: &str) -> Result<WeatherRecord, DownloadError> {
    let field = |idx: usize, column: &str| {
        record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| DownloadError::MissingColumn {
                column: column.to_string(),
                url: file.to_string(),
            })
    };
    let malformed = |column: &str, value: &str| DownloadError::MalformedValue {
        column: column.to_string(),
        value: value.to_string(),
        url: file.to_string(),
    };
    let int = |idx: usize, column: &str| -> Result<u32, DownloadError> {
        let raw = field(idx, column)?;
        raw.parse().map_err(|_| malformed(column, raw))
    };
    let real = |idx: usize, column: &str| -> Result<Option<f64>, DownloadError> {
        match field(idx, column)? {
            "" => Ok(None),
            raw => raw.parse().map(Some).map_err(|_| malformed(column, raw)),
        }
    };

    let (y, m, d) = (int(YEAR, "Year")?, int(MONTH, "Month")?, int(DAY, "Day")?);
    let date = NaiveDate::from_ymd_opt(y as i32, m, d)
        .ok_or_else(|| malformed("Date", &format!("{}-{}-{}", y, m, d)))?;

    let precip_type = match record.get(PRECIP_TYPE).map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => NO_PRECIP.to_string(),
    };

    Ok(WeatherRecord {
        date,
        std_temp: real(STD_TEMP, "Std Temp")?,
        precip_sum: real(PRECIP_SUM, "Precip Sum")?,
        precip_type,
    })
}

pub struct WeatherDownloader {
    fetcher: HttpFetcher,
    url_template: String,
    station: String,
}

impl WeatherDownloader {
    pub fn new(fetcher: HttpFetcher, cfg: &WeatherConfig) -> Self {
        Self {
            fetcher,
            url_template: cfg.url_template.clone(),
            station: cfg.station.clone(),
        }
    }

    fn month_url(&self, year: i32, month: u32) -> Result<Url, DownloadError> {
        let raw = fill_template(&self.url_template, year, Some(month));
        Url::parse(&raw).map_err(|e| DownloadError::fetch(&raw, e))
    }
}

impl WeatherDownloader {
    /// Fetch every published month of `year` as seen on `today`.
    async fn fetch_year(
        &self,
        year: i32,
        today: NaiveDate,
    ) -> Result<Vec<WeatherRecord>, DownloadError> {
        let months = published_months(year, today);
        let newest = *months.end();

        let mut out = Vec::new();
        for month in months {
            let url = self.month_url(year, month)?;
            let files = match fetch_zip_texts(&self.fetcher, &url, is_daily_file).await {
                Ok(files) => files,
                // the month that just ended may not be published yet
                Err(e) if year == today.year() && month == newest && e.is_soft() => {
                    warn!(year, month, error = %e, "newest archive not published yet");
                    break;
                }
                Err(e) => return Err(e),
            };
            for f in &files {
                let rows = parse_daily_csv(&f.text, &self.station, &f.name)?;
                debug!(file = %f.name, rows = rows.len(), "parsed daily file");
                out.extend(rows);
            }
        }

        out.sort_by_key(|r| r.date);
        Ok(out)
    }
}

/// Months whose archive can exist on `today`: all twelve for past years,
/// only the finished ones for the current year (none in January).
pub fn published_months(year: i32, today: NaiveDate) -> RangeInclusive<u32> {
    if year < today.year() {
        1..=12
    } else {
        1..=today.month() - 1
    }
}

impl Downloader for WeatherDownloader {
    type Output = Vec<WeatherRecord>;
    const NAME: &'static str = "weather";

    /// Monthly archives; any month failing fails the year.
    #[instrument(level = "info", skip(self))]
    async fn download(&self, year: i32) -> Result<Vec<WeatherRecord>, DownloadError> {
        check_year(year)?;
        let out = self.fetch_year(year, Local::now().date_naive()).await?;
        info!(year, station = %self.station, rows = out.len(), "weather downloaded");
        Ok(out)
    }
}
