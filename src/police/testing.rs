// src/police/testing.rs
//
// In-memory listing used by the locate/range/downloader tests.

use chrono::{Datelike, Duration, NaiveDate};
use std::sync::Mutex;

use super::{PageSource, PoliceRecord};
use crate::error::DownloadError;

pub(crate) fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub(crate) fn record(d: NaiveDate) -> PoliceRecord {
    PoliceRecord {
        date: d,
        accidents: Some(d.ordinal() % 50),
        deaths: Some(d.day() % 4),
        injuries: Some(d.ordinal() % 60),
    }
}

/// Every day from `newest` back to `oldest`, newest first.
pub(crate) fn descending(newest: &str, oldest: &str) -> Vec<PoliceRecord> {
    let (mut d, oldest) = (date(newest), date(oldest));
    let mut out = Vec::new();
    while d >= oldest {
        out.push(record(d));
        d -= Duration::days(1);
    }
    out
}

pub(crate) struct MemPages {
    pages: Vec<Vec<PoliceRecord>>,
    /// `(page, nth visit)` pairs that fail.
    failures: Vec<(u32, usize)>,
    visits: Mutex<Vec<u32>>,
}

impl MemPages {
    pub(crate) fn new(records: Vec<PoliceRecord>, page_size: usize) -> Self {
        Self {
            pages: records.chunks(page_size).map(<[_]>::to_vec).collect(),
            failures: Vec::new(),
            visits: Mutex::new(Vec::new()),
        }
    }

    /// Fail the `nth` (1-based) fetch of `page`.
    pub(crate) fn failing(mut self, page: u32, nth: usize) -> Self {
        self.failures.push((page, nth));
        self
    }

    pub(crate) fn page(&self, idx: u32) -> &[PoliceRecord] {
        &self.pages[idx as usize]
    }

    pub(crate) fn visits(&self) -> Vec<u32> {
        self.visits.lock().unwrap().clone()
    }

    pub(crate) fn reset_visits(&self) {
        self.visits.lock().unwrap().clear();
    }
}

impl PageSource for MemPages {
    async fn fetch_page(&self, page: u32) -> Result<Vec<PoliceRecord>, DownloadError> {
        let nth = {
            let mut visits = self.visits.lock().unwrap();
            visits.push(page);
            visits.iter().filter(|&&p| p == page).count()
        };
        if self.failures.contains(&(page, nth)) {
            return Err(DownloadError::fetch(
                format!("mem://page/{}", page),
                "injected failure",
            ));
        }
        Ok(self.pages.get(page as usize).cloned().unwrap_or_default())
    }
}
