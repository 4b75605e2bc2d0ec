//! # Eventweek
//!
//! Week-partitioned event store for a city events listing. Every event lives
//! in exactly one week partition; a derived index summarizes each non-empty
//! week and links the weeks chronologically.
//!
//! ## Features
//!
//! - **Two backends**: one JSON file per week, or a SQLite database
//! - **Stable identity**: ids and slugs are assigned once and never change
//! - **Derived index**: counts, cities and genres per week, kept in step with every write
//! - **Asset safety**: images still referenced by an event cannot be deleted
//! - **Admin API**: Axum HTTP surface with token auth and rate limiting
//!
//! ## Modules
//!
//! - [`storage`]: Backends, index maintenance and the `EventStore` façade
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eventweek::storage::*;
//! use chrono::{TimeZone, Utc};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = EventStore::open(&BackendConfig::file("data/events"))?;
//!
//!     let week: WeekKey = "2025-09-08".parse()?;
//!     let draft = EventDraft::new(
//!         "Jazz Night",
//!         Utc.with_ymd_and_hms(2025, 9, 12, 23, 0, 0).unwrap(),
//!         "San Juan",
//!         "music",
//!         "manual",
//!     );
//!     let event = store.create_event(week, draft)?;
//!
//!     let (found, found_week) = store.find_by_slug(&event.slug)?.unwrap();
//!     println!("{} is in week {}", found.title, found_week);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    BackendConfig, BackendKind, Event, EventBackend, EventDraft, EventPatch, EventStore,
    EventsIndex, StorageError, StorageResult, WeekKey, WeekSummary, WeeklyEvents,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{ApiSettings, Config, ConfigError, LoggingConfig, StorageConfig};
