// src/store/mod.rs

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub mod export;

pub const POLICE_FILE: &str = "police_data.csv";
pub const WEATHER_FILE: &str = "weather_data.csv";
pub const HOLIDAYS_FILE: &str = "holidays_data.csv";
pub const WEEKENDS_FILE: &str = "weekends_data.csv";
pub const POLICE_PARQUET: &str = "police_data.parquet";

/// `<path>.tmp` next to the target, so the final rename stays on one filesystem.
pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write rows under a header row taken from the serde field names.
///
/// The target is only replaced once every row has been written; on error the
/// previous file (if any) is left as it was.
pub fn save_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }

    let tmp = tmp_path(path);
    let written = write_rows(&tmp, rows);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.context(format!("writing {:?}", path)));
    }
    fs::rename(&tmp, path).with_context(|| format!("renaming {:?} -> {:?}", tmp, path))?;

    info!(path = %path.display(), rows = rows.len(), "saved csv");
    Ok(())
}

fn write_rows<T: Serialize>(tmp: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(tmp).with_context(|| format!("creating {:?}", tmp))?;
    let mut wtr = WriterBuilder::new().from_writer(BufWriter::new(file));
    for (idx, row) in rows.iter().enumerate() {
        wtr.serialize(row)
            .with_context(|| format!("serializing row {}", idx))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read back a file written by [`save_csv`].
pub fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {:?}", path))?;

    let rows = rdr
        .deserialize()
        .enumerate()
        .map(|(idx, r)| r.with_context(|| format!("{:?} record {}", path, idx)))
        .collect::<Result<Vec<T>>>()?;
    debug!(path = %path.display(), rows = rows.len(), "loaded csv");
    Ok(rows)
}
