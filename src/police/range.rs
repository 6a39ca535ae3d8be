// src/police/range.rs

use std::ops::RangeBounds;
use tracing::{debug, instrument};

use super::{PageRef, PageSource, PoliceRecord};
use crate::error::DownloadError;

/// Fetch every row from `first` to `last` inclusive, one batch per page, in
/// page order (newest page first).
///
/// All or nothing: the first page that fails drops everything collected so
/// far and the whole range reports `PartialRangeFailure`.
#[instrument(level = "debug", skip(source))]
pub async fn fetch_range<S: PageSource>(
    source: &S,
    first: PageRef,
    last: PageRef,
) -> Result<Vec<Vec<PoliceRecord>>, DownloadError> {
    debug_assert!(first.page <= last.page, "range runs backwards");

    let wrap = |page: u32, err: DownloadError| {
        if err.is_soft() {
            DownloadError::PartialRangeFailure {
                page,
                first: first.page,
                last: last.page,
                source: Box::new(err),
            }
        } else {
            err
        }
    };

    if first.page == last.page {
        let batch = fetch_slice(source, first.page, first.row..=last.row)
            .await
            .map_err(|e| wrap(first.page, e))?;
        return Ok(vec![batch]);
    }

    let mut batches = Vec::with_capacity((last.page - first.page + 1) as usize);

    let head = fetch_slice(source, first.page, first.row..)
        .await
        .map_err(|e| wrap(first.page, e))?;
    batches.push(head);

    for page in first.page + 1..last.page {
        let batch = fetch_slice(source, page, ..)
            .await
            .map_err(|e| wrap(page, e))?;
        batches.push(batch);
    }

    let tail = fetch_slice(source, last.page, ..=last.row)
        .await
        .map_err(|e| wrap(last.page, e))?;
    batches.push(tail);

    debug!(
        pages = batches.len(),
        rows = batches.iter().map(Vec::len).sum::<usize>(),
        "range fetched"
    );
    Ok(batches)
}

/// Fetch one page and keep `rows` of it. An empty page, or a page too short
/// for the requested rows (the listing moved under us), is a failure.
async fn fetch_slice<S: PageSource>(
    source: &S,
    page: u32,
    rows: impl RangeBounds<usize>,
) -> Result<Vec<PoliceRecord>, DownloadError> {
    let batch = source.fetch_page(page).await?;
    if batch.is_empty() {
        return Err(DownloadError::fetch(format!("page {}", page), "empty page"));
    }
    let len = batch.len();
    let bounds = (rows.start_bound().cloned(), rows.end_bound().cloned());
    batch.get(bounds).map(<[_]>::to_vec).ok_or_else(|| {
        DownloadError::fetch(
            format!("page {}", page),
            format!("rows {:?} out of range for {} rows", bounds, len),
        )
    })
}
