//! Flat-file backend
//!
//! Layout inside the data directory:
//!
//! ```text
//! 2025-09-08.json      { "weekStartDate": "...", "events": [...] }
//! 2025-09-15.json
//! _index.json          { "weeks": [...] }
//! ```
//!
//! Files are rewritten whole. A write goes to `<name>.tmp`, is fsynced, and
//! is renamed over the target, so readers see the old file or the new one.

use crate::storage::backend::{BackendKind, EventBackend, WeekScan};
use crate::storage::error::StorageResult;
use crate::storage::types::{EventsIndex, WeeklyEvents};
use crate::storage::week::WeekKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "_index.json";

/// One JSON document per week plus a JSON index
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) a data directory
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn week_path(&self, week: &WeekKey) -> PathBuf {
        self.dir.join(format!("{week}.json"))
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Week keys that have a file on disk, sorted
    fn stored_weeks(&self) -> StorageResult<Vec<WeekKey>> {
        let mut weeks = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Skips _index.json and anything else that is not a week key
            if let Ok(week) = stem.parse::<WeekKey>() {
                weeks.push(week);
            }
        }
        weeks.sort();
        Ok(weeks)
    }
}

/// Read and parse a JSON file; `Ok(None)` when the file does not exist
fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write JSON through a sibling temp file and an atomic rename
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");

    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

impl EventBackend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    fn read_week(&self, week: &WeekKey) -> StorageResult<WeeklyEvents> {
        let path = self.week_path(week);
        match read_json::<WeeklyEvents>(&path)? {
            Some(mut weekly) => {
                if weekly.week_start_date != *week {
                    tracing::warn!(
                        file = %path.display(),
                        stored = %weekly.week_start_date,
                        "Week file names a different week; using the file name"
                    );
                    weekly.week_start_date = *week;
                }
                Ok(weekly)
            }
            None => Ok(WeeklyEvents::empty(*week)),
        }
    }

    fn write_week(&self, week: &WeeklyEvents) -> StorageResult<()> {
        let path = self.week_path(&week.week_start_date);
        write_json_atomic(&path, week)?;
        tracing::debug!(week = %week.week_start_date, events = week.events.len(), "Wrote week file");
        Ok(())
    }

    fn read_index(&self) -> StorageResult<EventsIndex> {
        Ok(read_json(&self.index_path())?.unwrap_or_default())
    }

    fn write_index(&self, index: &EventsIndex) -> StorageResult<()> {
        write_json_atomic(&self.index_path(), index)?;
        tracing::debug!(weeks = index.weeks.len(), "Wrote index file");
        Ok(())
    }

    fn scan_weeks(&self) -> StorageResult<WeekScan<'_>> {
        let weeks = self.stored_weeks()?;
        Ok(Box::new(weeks.into_iter().map(move |week| self.read_week(&week))))
    }
}
