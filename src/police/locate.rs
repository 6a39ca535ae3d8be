// src/police/locate.rs
//
// Finding the first and last row of a year in a newest-first paginated listing
// without knowing how many pages exist or how many days a page covers.

use tracing::{debug, instrument, trace};

use super::{PageRef, PageSource, PoliceRecord};
use crate::error::DownloadError;

/// The forward scan's answer plus the batch it stopped on, so the backward
/// scan can start from it without fetching the page again.
#[derive(Debug, Clone)]
pub struct FirstRow {
    pub at: PageRef,
    pub batch: Vec<PoliceRecord>,
}

/// `(newest year, oldest year)` of a non-empty, newest-first batch.
fn year_span(batch: &[PoliceRecord]) -> (i32, i32) {
    let first = batch.first().map(PoliceRecord::year).unwrap_or_default();
    let last = batch.last().map(PoliceRecord::year).unwrap_or_default();
    (first, last)
}

async fn fetch_rows<S: PageSource>(
    source: &S,
    page: u32,
) -> Result<Vec<PoliceRecord>, DownloadError> {
    let batch = source.fetch_page(page).await?;
    if batch.is_empty() {
        return Err(DownloadError::fetch(format!("page {}", page), "empty page"));
    }
    Ok(batch)
}

/// Forward scan: walk from page 0 while the whole page is newer than `year`,
/// then return the first row of `year` on the page where that stops.
#[instrument(level = "debug", skip(source))]
pub async fn find_first<S: PageSource>(source: &S, year: i32) -> Result<FirstRow, DownloadError> {
    let mut page = 0;
    let mut batch = fetch_rows(source, page).await?;

    loop {
        let (first_year, last_year) = year_span(&batch);
        trace!(page, first_year, last_year, "forward scan");
        // stop as soon as either end of the page reaches the target year
        if !(first_year > year && last_year > year) {
            break;
        }
        page += 1;
        batch = fetch_rows(source, page).await?;
    }

    let row = batch
        .iter()
        .position(|r| r.year() == year)
        .ok_or(DownloadError::BoundaryNotFound { year, page })?;
    debug!(page, row, "first row located");
    Ok(FirstRow {
        at: PageRef::new(page, row),
        batch,
    })
}

/// Backward scan: from the first page, walk while the page has not yet
/// dropped below `year`, step back if it overshot, then return the last row
/// of `year` on that page.
///
/// An empty page while advancing means the listing ended; the page before it
/// is the last one.
#[instrument(level = "debug", skip(source, first), fields(first_page = first.at.page))]
pub async fn find_last<S: PageSource>(
    source: &S,
    year: i32,
    first: FirstRow,
) -> Result<PageRef, DownloadError> {
    let mut page = first.at.page;
    let mut batch = first.batch;
    let mut previous: Option<Vec<PoliceRecord>> = None;

    loop {
        let (first_year, last_year) = year_span(&batch);
        trace!(page, first_year, last_year, "backward scan");
        if !(first_year >= year && last_year >= year) {
            break;
        }
        let next = source.fetch_page(page + 1).await?;
        if next.is_empty() {
            debug!(page, "listing ends");
            break;
        }
        previous = Some(std::mem::replace(&mut batch, next));
        page += 1;
    }

    // the page we stopped on starts below the year: the previous one was last
    if year_span(&batch).0 < year {
        if let Some(prev) = previous {
            batch = prev;
            page -= 1;
        }
    }

    let row = batch
        .iter()
        .rposition(|r| r.year() == year)
        .ok_or(DownloadError::BoundaryNotFound { year, page })?;
    debug!(page, row, "last row located");
    Ok(PageRef::new(page, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::police::testing::{date, descending, MemPages};

    #[tokio::test]
    async fn test_single_page_year() {
        let src = MemPages::new(descending("2023-03-01", "2023-01-01"), 100);

        let first = find_first(&src, 2023).await.unwrap();
        assert_eq!(first.at, PageRef::new(0, 0));
        assert_eq!(src.visits(), vec![0]);

        let last = find_last(&src, 2023, first).await.unwrap();
        assert_eq!(last, PageRef::new(0, 59));
        // page 0 is reused; only the end-of-listing check goes out
        assert_eq!(src.visits(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_older_year_scans_forward() {
        let mut recs = descending("2023-03-01", "2023-01-01");
        recs.extend(descending("2022-12-31", "2022-11-02"));
        let src = MemPages::new(recs, 60);

        let first = find_first(&src, 2022).await.unwrap();
        assert_eq!(first.at, PageRef::new(1, 0));
        assert_eq!(src.visits(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_year_starting_mid_page() {
        // page 0 spans 2024-01-05 .. 2023-12-07; 2023 starts at row 5
        let src = MemPages::new(descending("2024-01-05", "2023-06-01"), 30);
        let first = find_first(&src, 2023).await.unwrap();
        assert_eq!(first.at, PageRef::new(0, 5));
        assert_eq!(first.batch[5].date, date("2023-12-31"));
        assert_eq!(src.visits(), vec![0]);
    }

    #[tokio::test]
    async fn test_multi_page_bounds() {
        let src = MemPages::new(descending("2024-02-10", "2020-11-01"), 30);

        let first = find_first(&src, 2022).await.unwrap();
        let first_at = first.at;
        let last = find_last(&src, 2022, first).await.unwrap();

        assert_eq!(src.page(first_at.page)[first_at.row].date, date("2022-12-31"));
        assert_eq!(src.page(last.page)[last.row].date, date("2022-01-01"));
        assert!(first_at.page < last.page);
        if first_at.row > 0 {
            assert_eq!(src.page(first_at.page)[first_at.row - 1].year(), 2023);
        }
    }

    #[tokio::test]
    async fn test_year_ending_on_page_boundary() {
        // 2022 ends exactly at the end of page 1: the backward scan must step
        // back from page 2 (all 2021)
        let mut recs = descending("2022-12-31", "2022-12-02");
        recs.extend(descending("2022-12-01", "2022-11-02"));
        recs.extend(descending("2021-12-31", "2021-12-02"));
        let src = MemPages::new(recs, 30);
        assert_eq!(src.page(1).last().unwrap().date, date("2022-11-02"));

        let first = find_first(&src, 2022).await.unwrap();
        let last = find_last(&src, 2022, first).await.unwrap();
        assert_eq!(last, PageRef::new(1, 29));
        assert_eq!(src.visits(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_oldest_year_runs_to_end_of_listing() {
        let src = MemPages::new(descending("2021-01-20", "2020-11-01"), 25);
        let first = find_first(&src, 2020).await.unwrap();
        let last = find_last(&src, 2020, first).await.unwrap();
        let pages = descending("2021-01-20", "2020-11-01").len().div_ceil(25) as u32;
        assert_eq!(last.page, pages - 1);
        assert_eq!(src.page(last.page)[last.row].date, date("2020-11-01"));
    }

    #[tokio::test]
    async fn test_missing_year_is_boundary_not_found() {
        let mut recs = descending("2023-01-31", "2023-01-01");
        recs.extend(descending("2021-12-31", "2021-12-01"));
        let src = MemPages::new(recs, 20);

        let err = find_first(&src, 2022).await.unwrap_err();
        assert!(matches!(err, DownloadError::BoundaryNotFound { year: 2022, .. }));
        assert!(err.is_soft());
    }

    #[tokio::test]
    async fn test_first_page_unreachable() {
        let src = MemPages::new(descending("2023-03-01", "2023-01-01"), 100).failing(0, 1);
        let err = find_first(&src, 2023).await.unwrap_err();
        assert!(matches!(err, DownloadError::FetchFailure { .. }));
        assert_eq!(src.visits(), vec![0]);
    }

    #[tokio::test]
    async fn test_forward_scan_past_end_fails() {
        let src = MemPages::new(descending("2023-03-01", "2023-01-01"), 100);
        let err = find_first(&src, 2019).await.unwrap_err();
        assert!(matches!(err, DownloadError::FetchFailure { .. }));
        assert_eq!(src.visits(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_backward_scan_failure_aborts() {
        let src = MemPages::new(descending("2023-03-01", "2022-06-01"), 30).failing(2, 1);
        let first = find_first(&src, 2023).await.unwrap();
        assert!(find_last(&src, 2023, first).await.is_err());
    }
}
