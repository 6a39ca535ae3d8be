// src/police/source.rs

use anyhow::{Context, Result};
use scraper::Selector;
use url::Url;

use super::{records_from_table, PageSource, PoliceRecord};
use crate::config::PoliceConfig;
use crate::error::DownloadError;
use crate::fetch::{page_url, selector, HttpFetcher};

/// Listing pages served over HTTP, one `?page=N` request per page.
#[derive(Debug, Clone)]
pub struct HttpPages {
    fetcher: HttpFetcher,
    base: Url,
    table: Selector,
}

impl HttpPages {
    pub fn new(fetcher: HttpFetcher, cfg: &PoliceConfig) -> Result<Self> {
        let base = Url::parse(&cfg.url).with_context(|| format!("parsing {}", cfg.url))?;
        Ok(Self {
            fetcher,
            base,
            table: selector(&cfg.table_selector)?,
        })
    }

    pub fn url(&self, page: u32) -> Url {
        page_url(&self.base, page)
    }
}

impl PageSource for HttpPages {
    async fn fetch_page(&self, page: u32) -> Result<Vec<PoliceRecord>, DownloadError> {
        let url = self.url(page);
        let table = self.fetcher.fetch_table(&url, &self.table).await?;
        records_from_table(&table, url.as_str())
    }
}
