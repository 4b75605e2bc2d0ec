//! Storage backends for weekly event partitions and the week index.
//!
//! - **file**: one JSON file per week plus `_index.json`, atomic via temp + rename
//! - **relational**: SQLite tables `events`, `event_images`, `event_sponsors`,
//!   `event_weeks`, one transaction per write
//!
//! Both honor the same contract: a missing week reads as empty, writes
//! replace the whole week (or the whole index) atomically, and every I/O
//! failure surfaces as a `StorageError`.

mod file;
mod sqlite;

pub use file::FileBackend;
pub use sqlite::SqliteBackend;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{EventsIndex, WeeklyEvents};
use crate::storage::week::WeekKey;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Which backend to run against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    #[serde(alias = "json")]
    File,
    #[serde(alias = "sqlite")]
    Relational,
}

impl FromStr for BackendKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" | "json" => Ok(BackendKind::File),
            "relational" | "sqlite" => Ok(BackendKind::Relational),
            other => Err(StorageError::Config(format!(
                "unknown backend '{other}' (expected file or relational)"
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::File => write!(f, "file"),
            BackendKind::Relational => write!(f, "relational"),
        }
    }
}

/// Iterator over every stored week
pub type WeekScan<'a> = Box<dyn Iterator<Item = StorageResult<WeeklyEvents>> + 'a>;

/// Persistence contract shared by both backends
pub trait EventBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Read a week; a week that was never written is empty, not an error
    fn read_week(&self, week: &WeekKey) -> StorageResult<WeeklyEvents>;

    /// Replace the full contents of a week atomically
    fn write_week(&self, week: &WeeklyEvents) -> StorageResult<()>;

    /// Read the week index; an absent index is empty
    fn read_index(&self) -> StorageResult<EventsIndex>;

    /// Replace the whole index atomically
    fn write_index(&self, index: &EventsIndex) -> StorageResult<()>;

    /// Every stored week, in chronological order
    fn scan_weeks(&self) -> StorageResult<WeekScan<'_>>;

    /// Persist a week together with the index derived from it.
    ///
    /// The default writes the week first and the index second; if the index
    /// write fails the week is already durable and the error is returned.
    fn commit(&self, week: &WeeklyEvents, index: &EventsIndex) -> StorageResult<()> {
        self.write_week(week)?;
        if let Err(e) = self.write_index(index) {
            tracing::error!(
                week = %week.week_start_date,
                error = %e,
                "Index write failed after week write; index is stale until the next write or rebuild"
            );
            return Err(e);
        }
        Ok(())
    }
}

/// Backend construction settings
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Directory holding `<week>.json` and `_index.json`
    pub data_dir: PathBuf,
    /// SQLite database file
    pub sqlite_path: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data").join("events");
        Self {
            kind: BackendKind::File,
            sqlite_path: PathBuf::from("data").join("events.sqlite"),
            data_dir,
        }
    }
}

impl BackendConfig {
    pub fn file(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind: BackendKind::File,
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn relational(sqlite_path: impl Into<PathBuf>) -> Self {
        Self {
            kind: BackendKind::Relational,
            sqlite_path: sqlite_path.into(),
            ..Default::default()
        }
    }
}

/// Open the configured backend
pub fn open_backend(config: &BackendConfig) -> StorageResult<Arc<dyn EventBackend>> {
    let backend: Arc<dyn EventBackend> = match config.kind {
        BackendKind::File => Arc::new(FileBackend::open(&config.data_dir)?),
        BackendKind::Relational => Arc::new(SqliteBackend::open(&config.sqlite_path)?),
    };
    tracing::info!(backend = %config.kind, "Opened event backend");
    Ok(backend)
}

/// Summary of a backend-to-backend copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub weeks: usize,
    pub events: usize,
}

/// Copy every week and the index from one backend into another.
///
/// Weeks already present in `to` with the same key are replaced; other
/// weeks in `to` are left alone.
pub fn migrate(from: &dyn EventBackend, to: &dyn EventBackend) -> StorageResult<MigrationReport> {
    let mut report = MigrationReport::default();

    for week in from.scan_weeks()? {
        let week = week?;
        report.weeks += 1;
        report.events += week.events.len();
        to.write_week(&week)?;
    }

    to.write_index(&from.read_index()?)?;

    tracing::info!(
        from = %from.kind(),
        to = %to.kind(),
        weeks = report.weeks,
        events = report.events,
        "Migrated event data"
    );
    Ok(report)
}
