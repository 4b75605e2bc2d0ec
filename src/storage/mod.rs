//! Eventweek storage
//!
//! Events are partitioned by the Monday that starts their week:
//!
//! - **week**: `WeekKey`, the partition key
//! - **types**: Event, WeeklyEvents, WeekSummary, EventsIndex
//! - **slug**: id and slug assignment
//! - **backend**: `EventBackend` with flat-file and SQLite implementations
//! - **index**: derived per-week summaries and their chronological chain
//! - **integrity**: media reference checks
//! - **store**: `EventStore`, the façade every caller goes through
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   EventStore → week lock → read week → mutate → index lock → merge summary → commit
//!
//! Read Path:
//!   EventStore → backend read (missing week = empty)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use eventweek::storage::{BackendConfig, EventDraft, EventStore, WeekKey};
//! use chrono::{TimeZone, Utc};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = EventStore::open(&BackendConfig::file("./data/events"))?;
//!
//!     let start = Utc.with_ymd_and_hms(2025, 9, 12, 23, 0, 0).unwrap();
//!     let week = WeekKey::containing(&start);
//!     let event = store.create_event(
//!         week,
//!         EventDraft::new("Jazz Night", start, "San Juan", "music", "manual"),
//!     )?;
//!
//!     let (found, _) = store.find_by_slug(&event.slug)?.expect("just created");
//!     println!("{} in week {}", found.title, week);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod clock;
pub mod error;
pub mod index;
pub mod integrity;
pub mod slug;
pub mod store;
pub mod timefmt;
pub mod types;
pub mod week;

// Re-exports for convenience
pub use backend::{
    migrate, open_backend, BackendConfig, BackendKind, EventBackend, FileBackend,
    MigrationReport, SqliteBackend,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{StorageError, StorageResult};
pub use index::IndexIssue;
pub use integrity::AssetReference;
pub use store::EventStore;
pub use types::{
    Event, EventDraft, EventImage, EventLinks, EventPatch, EventStatus, EventsIndex, Placement,
    Sponsor, WeekSummary, WeeklyEvents,
};
pub use week::WeekKey;
