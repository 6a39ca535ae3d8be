// src/error.rs

use thiserror::Error;

/// Everything that can go wrong while pulling a dataset off the web.
///
/// Variants split into two groups. *Soft* failures (`FetchFailure`,
/// `BoundaryNotFound`, `PartialRangeFailure`) mean "no data this time": the
/// caller logs them and keeps whatever it had before. Everything else is fatal
/// for the invocation and propagates.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("year {year} is in the future (current year is {current})")]
    InvalidYear { year: i32, current: i32 },

    #[error("failed to fetch {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    #[error("no rows for {year} on page {page}")]
    BoundaryNotFound { year: i32, page: u32 },

    #[error("page {page} of range {first}..={last} failed")]
    PartialRangeFailure {
        page: u32,
        first: u32,
        last: u32,
        #[source]
        source: Box<DownloadError>,
    },

    #[error("malformed date {value:?} in {url}")]
    MalformedDate {
        value: String,
        url: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("malformed value {value:?} in column {column:?} of {url}")]
    MalformedValue {
        column: String,
        value: String,
        url: String,
    },

    #[error("column {column:?} not found in table from {url}")]
    MissingColumn { column: String, url: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl DownloadError {
    pub(crate) fn fetch(url: impl ToString, reason: impl ToString) -> Self {
        DownloadError::FetchFailure {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Soft failures are logged and swallowed at the `update` boundary.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            DownloadError::FetchFailure { .. }
                | DownloadError::BoundaryNotFound { .. }
                | DownloadError::PartialRangeFailure { .. }
        )
    }
}
