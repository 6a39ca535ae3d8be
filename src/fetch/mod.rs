// src/fetch/mod.rs

use anyhow::{anyhow, ensure};
use reqwest::{Client, Response};
use scraper::Selector;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::error::DownloadError;

pub mod table;
pub mod urls;
pub mod zips;

#[cfg(test)]
pub(crate) mod testing;

pub use table::{parse_table, RawTable};
pub use urls::{fill_template, page_url};

/// Parse a CSS selector coming from configuration.
pub fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid CSS selector {:?}: {:?}", css, e))
}

/// Throttled HTTP client shared by every downloader.
///
/// Each request sleeps for the configured delay first, so a sequential caller
/// never hits the source faster than one request per delay.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    delay: Duration,
}

impl HttpFetcher {
    /// Fails on a zero delay: every request must be throttled.
    pub fn new(cfg: &FetchConfig) -> anyhow::Result<Self> {
        ensure!(
            !cfg.delay().is_zero(),
            "fetch.request_delay_ms must be positive"
        );
        let client = Client::builder()
            .timeout(cfg.timeout())
            .user_agent(cfg.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            delay: cfg.delay(),
        })
    }

    async fn get(&self, url: &Url) -> Result<Response, DownloadError> {
        sleep(self.delay).await;
        debug!(%url, "GET");

        let resp = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                warn!(%url, error = %e, "request failed");
                return Err(DownloadError::fetch(url, e));
            }
            Err(e) => return Err(e.into()),
        };

        let status = resp.status();
        if !status.is_success() {
            warn!(%url, %status, "non-success status");
            return Err(DownloadError::fetch(url, format!("HTTP {}", status)));
        }
        Ok(resp)
    }

    /// GET `url` and pull out the first table matching `selector`.
    /// A page without that table is a fetch failure.
    pub async fn fetch_table(
        &self,
        url: &Url,
        selector: &Selector,
    ) -> Result<RawTable, DownloadError> {
        let body = self
            .get(url)
            .await?
            .text()
            .await
            .map_err(|e| DownloadError::fetch(url, e))?;

        let table = parse_table(&body, selector).ok_or_else(|| {
            warn!(%url, "expected table not found");
            DownloadError::fetch(url, "expected table not found")
        })?;
        debug!(%url, rows = table.rows.len(), "parsed table");
        Ok(table)
    }

    /// GET `url` and return the raw body.
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, DownloadError> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| DownloadError::fetch(url, e))?;
        debug!(%url, size = bytes.len(), "downloaded");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{fetch_config, refused_url, serve};
    use super::*;
    use std::time::Instant;

    const PAGE: &str = r#"<html><body>
<table class="listing"><thead><tr><th>Data</th><th>Ranni</th></tr></thead>
<tbody><tr><td>2023-03-01</td><td>4</td></tr></tbody></table>
</body></html>"#;

    fn listing() -> Selector {
        selector("table.listing").unwrap()
    }

    fn assert_soft_fetch_failure(err: &DownloadError) {
        assert!(matches!(err, DownloadError::FetchFailure { .. }), "{err:?}");
        assert!(err.is_soft());
    }

    #[test]
    fn test_zero_delay_rejected() {
        assert!(HttpFetcher::new(&fetch_config(0)).is_err());
        assert!(HttpFetcher::new(&fetch_config(1)).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_table() {
        let base = serve(|_| (200, PAGE.as_bytes().to_vec())).await;
        let fetcher = HttpFetcher::new(&fetch_config(10)).unwrap();

        let table = fetcher.fetch_table(&base, &listing()).await.unwrap();
        assert_eq!(table.headers, ["Data", "Ranni"]);
        assert_eq!(table.rows, [["2023-03-01", "4"]]);
    }

    #[tokio::test]
    async fn test_not_found_is_soft() {
        let base = serve(|_| (404, b"gone".to_vec())).await;
        let fetcher = HttpFetcher::new(&fetch_config(10)).unwrap();

        let err = fetcher.fetch_table(&base, &listing()).await.unwrap_err();
        assert_soft_fetch_failure(&err);
        assert!(err.to_string().contains("404"));

        let err = fetcher.fetch_bytes(&base).await.unwrap_err();
        assert_soft_fetch_failure(&err);
    }

    #[tokio::test]
    async fn test_server_error_is_soft() {
        let base = serve(|_| (500, Vec::new())).await;
        let fetcher = HttpFetcher::new(&fetch_config(10)).unwrap();
        let err = fetcher.fetch_bytes(&base).await.unwrap_err();
        assert_soft_fetch_failure(&err);
    }

    #[tokio::test]
    async fn test_missing_table_is_soft() {
        let base = serve(|_| (200, b"<html><body><p>maintenance</p></body></html>".to_vec())).await;
        let fetcher = HttpFetcher::new(&fetch_config(10)).unwrap();

        let err = fetcher.fetch_table(&base, &listing()).await.unwrap_err();
        assert_soft_fetch_failure(&err);
        assert!(err.to_string().contains("expected table not found"));
    }

    #[tokio::test]
    async fn test_refused_connection_is_soft_and_throttled() {
        let url = refused_url().await;
        let fetcher = HttpFetcher::new(&fetch_config(50)).unwrap();

        let started = Instant::now();
        let err = fetcher.fetch_bytes(&url).await.unwrap_err();
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_soft_fetch_failure(&err);
    }

    #[tokio::test]
    async fn test_delay_before_every_request() {
        let base = serve(|_| (200, b"ok".to_vec())).await;
        let fetcher = HttpFetcher::new(&fetch_config(40)).unwrap();

        let started = Instant::now();
        for _ in 0..3 {
            assert_eq!(fetcher.fetch_bytes(&base).await.unwrap(), b"ok");
        }
        assert!(started.elapsed() >= Duration::from_millis(120));
    }
}
