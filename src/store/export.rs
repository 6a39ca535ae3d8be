// src/store/export.rs
//
// Parquet copy of the police dataset.

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
    sync::Arc,
};
use tracing::info;

use super::tmp_path;
use crate::police::{
    PoliceRecord, ACCIDENTS_COLUMN, DATE_COLUMN, DEATHS_COLUMN, INJURIES_COLUMN,
};

pub fn police_schema() -> Schema {
    Schema::new(vec![
        Field::new(DATE_COLUMN, DataType::Date32, false),
        Field::new(ACCIDENTS_COLUMN, DataType::UInt32, true),
        Field::new(DEATHS_COLUMN, DataType::UInt32, true),
        Field::new(INJURIES_COLUMN, DataType::UInt32, true),
    ])
}

// NaiveDate::default() is 1970-01-01
fn days_since_epoch(d: NaiveDate) -> i32 {
    (d - NaiveDate::default()).num_days() as i32
}

pub fn police_batch(rows: &[PoliceRecord]) -> Result<RecordBatch> {
    let counter = |f: fn(&PoliceRecord) -> Option<u32>| -> ArrayRef {
        Arc::new(rows.iter().map(f).collect::<UInt32Array>())
    };
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from_iter_values(
            rows.iter().map(|r| days_since_epoch(r.date)),
        )),
        counter(|r| r.accidents),
        counter(|r| r.deaths),
        counter(|r| r.injuries),
    ];
    RecordBatch::try_new(Arc::new(police_schema()), columns).context("building police batch")
}

/// Write `rows` as one SNAPPY-compressed row group, replacing `path` atomically.
pub fn write_police(path: &Path, rows: &[PoliceRecord]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }
    let batch = police_batch(rows)?;

    let tmp = tmp_path(path);
    let file = File::create(&tmp).with_context(|| format!("creating {:?}", tmp))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
        .context("creating Arrow writer for police data")?;
    writer.write(&batch).context("writing police batch")?;
    writer.close().context("closing police writer")?;
    fs::rename(&tmp, path).with_context(|| format!("renaming {:?} -> {:?}", tmp, path))?;

    info!(path = %path.display(), rows = rows.len(), "saved parquet");
    Ok(())
}
