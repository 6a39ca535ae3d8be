// src/pipeline.rs
//
// Multi-year runs: download every requested year in order, then write one
// file per dataset. A year that fails stops the run before anything is saved.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::calendar::weekends;
use crate::config::Config;
use crate::downloader::Downloader;
use crate::fetch::HttpFetcher;
use crate::holidays::{Holiday, HolidaysDownloader};
use crate::police::{HttpPages, PageSource, PoliceDataDownloader, PoliceRecord};
use crate::store::{self, export};
use crate::weather::{WeatherDownloader, WeatherRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Years {
    pub start: i32,
    pub end: i32,
}

impl Years {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            bail!("start year {} is after end year {}", start, end);
        }
        Ok(Self { start, end })
    }

    pub fn iter(self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

/// Run `dl` for each year in turn and concatenate the results.
pub async fn collect_years<D, R>(dl: &D, years: Years) -> Result<Vec<R>>
where
    D: Downloader,
    D::Output: IntoIterator<Item = R>,
{
    let mut out = Vec::new();
    for year in years.iter() {
        let rows = dl
            .download(year)
            .await
            .with_context(|| format!("downloading {} data for {}", D::NAME, year))?;
        let before = out.len();
        out.extend(rows);
        info!(dataset = D::NAME, year, rows = out.len() - before, "year done");
    }
    Ok(out)
}

/// Police years go through `update`, so soft failures are logged where they
/// happen; any year without data still fails the run.
pub async fn police_years<S: PageSource>(
    dl: &mut PoliceDataDownloader<S>,
    years: Years,
) -> Result<Vec<PoliceRecord>> {
    let mut out = Vec::new();
    for year in years.iter() {
        if !dl.update(year).await.with_context(|| format!("police data for {}", year))? {
            bail!("police data for {} unavailable", year);
        }
        if let Some(rs) = dl.take_data() {
            out.extend(rs.into_records());
        }
    }
    Ok(out)
}

/// Download police data from `source` and save it under `data_dir`.
pub async fn export_police<S: PageSource>(
    source: S,
    years: Years,
    data_dir: &Path,
    format: OutputFormat,
) -> Result<PathBuf> {
    let mut dl = PoliceDataDownloader::new(source);
    let rows = police_years(&mut dl, years).await?;
    let path = match format {
        OutputFormat::Csv => {
            let path = data_dir.join(store::POLICE_FILE);
            store::save_csv(&path, &rows)?;
            path
        }
        OutputFormat::Parquet => {
            let path = data_dir.join(store::POLICE_PARQUET);
            export::write_police(&path, &rows)?;
            path
        }
    };
    Ok(path)
}

#[instrument(level = "info", skip(cfg))]
pub async fn run_police(cfg: &Config, years: Years, format: OutputFormat) -> Result<PathBuf> {
    let pages = HttpPages::new(HttpFetcher::new(&cfg.fetch)?, &cfg.police)?;
    export_police(pages, years, &cfg.output.data_dir, format).await
}

#[instrument(level = "info", skip(cfg))]
pub async fn run_weather(cfg: &Config, years: Years) -> Result<PathBuf> {
    let dl = WeatherDownloader::new(HttpFetcher::new(&cfg.fetch)?, &cfg.weather);
    let rows: Vec<WeatherRecord> = collect_years(&dl, years).await?;
    let path = cfg.output.data_dir.join(store::WEATHER_FILE);
    store::save_csv(&path, &rows)?;
    Ok(path)
}

#[instrument(level = "info", skip(cfg))]
pub async fn run_holidays(cfg: &Config, years: Years) -> Result<PathBuf> {
    let dl = HolidaysDownloader::new(HttpFetcher::new(&cfg.fetch)?, &cfg.holidays)?;
    let rows: Vec<Holiday> = collect_years(&dl, years).await?;
    let path = cfg.output.data_dir.join(store::HOLIDAYS_FILE);
    store::save_csv(&path, &rows)?;
    Ok(path)
}

pub fn run_weekends(cfg: &Config, years: Years) -> Result<PathBuf> {
    let path = cfg.output.data_dir.join(store::WEEKENDS_FILE);
    store::save_csv(&path, &weekends(years.start, years.end))?;
    Ok(path)
}

/// Every dataset, one after another. Stops at the first dataset that fails;
/// files already written for earlier datasets stay.
pub async fn run_all(cfg: &Config, years: Years, format: OutputFormat) -> Result<Vec<PathBuf>> {
    Ok(vec![
        run_police(cfg, years, format).await?,
        run_weather(cfg, years).await?,
        run_holidays(cfg, years).await?,
        run_weekends(cfg, years)?,
    ])
}
