// src/downloader.rs

use chrono::{Datelike, Local};

use crate::error::DownloadError;

/// A dataset that can be pulled for one calendar year.
///
/// Implementations own no state between calls: every `download` builds its
/// result from scratch and either returns all of it or an error.
#[allow(async_fn_in_trait)]
pub trait Downloader {
    type Output;

    /// Short name used in logs.
    const NAME: &'static str;

    async fn download(&self, year: i32) -> Result<Self::Output, DownloadError>;
}

/// Reject years after the current one before touching the network.
pub fn check_year(year: i32) -> Result<(), DownloadError> {
    let current = Local::now().year();
    if year > current {
        return Err(DownloadError::InvalidYear { year, current });
    }
    Ok(())
}
