// src/fetch/zips.rs

use encoding_rs::WINDOWS_1250;
use std::io::{Cursor, Read};
use tracing::trace;
use url::Url;
use zip::ZipArchive;

use super::HttpFetcher;
use crate::error::DownloadError;

/// One file pulled out of an archive, decoded as Windows-1250.
#[derive(Debug, Clone)]
pub struct ZipText {
    pub name: String,
    pub text: String,
}

/// Download the ZIP at `url` and decode every entry whose file name passes `keep`.
pub async fn fetch_zip_texts(
    fetcher: &HttpFetcher,
    url: &Url,
    keep: impl Fn(&str) -> bool,
) -> Result<Vec<ZipText>, DownloadError> {
    let bytes = fetcher.fetch_bytes(url).await?;
    extract_texts(bytes, keep)
}

pub fn extract_texts(
    bytes: Vec<u8>,
    keep: impl Fn(&str) -> bool,
) -> Result<Vec<ZipText>, DownloadError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut out = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        // strip any directory prefix the archive carries
        let name = entry
            .name()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if !keep(&name) {
            trace!(name = %name, "skipping zip entry");
            continue;
        }
        // the header's size is not trusted for preallocation
        let mut raw = Vec::new();
        entry.read_to_end(&mut raw)?;
        out.push(ZipText {
            name,
            text: decode_cp1250(&raw),
        });
    }

    Ok(out)
}

/// IMGW publishes its CSV files in the Central European Windows code page.
fn decode_cp1250(raw: &[u8]) -> String {
    WINDOWS_1250.decode_without_bom_handling(raw).0.into_owned()
}
