// src/police/downloader.rs

use tracing::{error, info, instrument};

use super::locate::{find_first, find_last};
use super::range::fetch_range;
use super::{PageSource, ResultSet};
use crate::downloader::{check_year, Downloader};
use crate::error::DownloadError;

/// Downloads one year of police data at a time and remembers the last
/// successful result.
pub struct PoliceDataDownloader<S> {
    source: S,
    data: Option<ResultSet>,
}

impl<S: PageSource> PoliceDataDownloader<S> {
    pub fn new(source: S) -> Self {
        Self { source, data: None }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Last successful download, sorted by date.
    pub fn get_data(&self) -> Option<&ResultSet> {
        self.data.as_ref()
    }

    pub fn take_data(&mut self) -> Option<ResultSet> {
        self.data.take()
    }

    /// Download `year` and keep it on success.
    ///
    /// Soft failures are logged and leave the previous data untouched
    /// (`Ok(false)`); `InvalidYear` and fatal errors are returned.
    #[instrument(level = "info", skip(self))]
    pub async fn update(&mut self, year: i32) -> Result<bool, DownloadError> {
        match self.download(year).await {
            Ok(rs) => {
                info!(year, rows = rs.len(), "police data downloaded");
                self.data = Some(rs);
                Ok(true)
            }
            Err(e) if e.is_soft() => {
                error!(year, error = %e, "failed to download police data");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

impl<S: PageSource> Downloader for PoliceDataDownloader<S> {
    type Output = ResultSet;
    const NAME: &'static str = "police";

    async fn download(&self, year: i32) -> Result<ResultSet, DownloadError> {
        check_year(year)?;

        // ─── 1) locate the year's first and last rows ──────────────────
        let first = find_first(&self.source, year).await?;
        let first_at = first.at;
        let last_at = find_last(&self.source, year, first).await?;
        info!(
            year,
            first_page = first_at.page,
            last_page = last_at.page,
            "located year"
        );

        // ─── 2) pull the range and accumulate ──────────────────────────
        let batches = fetch_range(&self.source, first_at, last_at).await?;
        Ok(ResultSet::from_batches(year, batches))
    }
}
