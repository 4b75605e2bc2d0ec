//! Event store
//!
//! The single entry point for reading and writing events:
//! - Write path: lock week → read week → mutate → lock index → merge summary → commit
//! - Read path: backend read, no locks
//!
//! Writers to the same week are serialized by a per-week mutex; index
//! updates are serialized by one index mutex. Locks are always taken week
//! first, index second. Nothing here coordinates separate processes.

use crate::storage::backend::{open_backend, BackendConfig, EventBackend};
use crate::storage::clock::{Clock, SystemClock};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::index::{self, IndexIssue};
use crate::storage::integrity::{self, AssetReference};
use crate::storage::slug::{new_event_id, new_event_slug};
use crate::storage::timefmt;
use crate::storage::types::{Event, EventDraft, EventPatch, EventsIndex, WeeklyEvents};
use crate::storage::week::WeekKey;
use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

fn lock_err<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Lock(e.to_string())
}

/// Week-partitioned event store over a pluggable backend
pub struct EventStore {
    backend: Arc<dyn EventBackend>,
    clock: Arc<dyn Clock>,
    week_locks: Mutex<HashMap<WeekKey, Arc<Mutex<()>>>>,
    index_lock: Mutex<()>,
}

impl EventStore {
    pub fn new(backend: Arc<dyn EventBackend>) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: Arc<dyn EventBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            week_locks: Mutex::new(HashMap::new()),
            index_lock: Mutex::new(()),
        }
    }

    /// Open the configured backend and wrap it
    pub fn open(config: &BackendConfig) -> StorageResult<Self> {
        Ok(Self::new(open_backend(config)?))
    }

    pub fn backend(&self) -> &dyn EventBackend {
        self.backend.as_ref()
    }

    /// Clock time at stored precision
    pub fn now(&self) -> DateTime<Utc> {
        timefmt::truncate(self.clock.now())
    }

    /// The week containing "now" in local time
    pub fn current_week(&self) -> WeekKey {
        WeekKey::containing(&self.now().with_timezone(&Local))
    }

    /// Run `f` while holding the week's writer lock.
    ///
    /// The lock entry is dropped from the map once no other writer holds or
    /// waits on it, so the map only grows with concurrently written weeks.
    fn with_week_lock<T>(
        &self,
        week: WeekKey,
        f: impl FnOnce() -> StorageResult<T>,
    ) -> StorageResult<T> {
        let lock = {
            let mut locks = self.week_locks.lock().map_err(lock_err)?;
            Arc::clone(locks.entry(week).or_default())
        };

        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(e) => Err(lock_err(e)),
        };

        if let Ok(mut locks) = self.week_locks.lock() {
            let idle = locks
                .get(&week)
                .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
            if idle {
                locks.remove(&week);
            }
        }
        result
    }

    /// Merge the week's summary into the index and persist both
    fn persist(&self, weekly: &WeeklyEvents, now: DateTime<Utc>) -> StorageResult<()> {
        let _index_guard: MutexGuard<'_, ()> = self.index_lock.lock().map_err(lock_err)?;
        let index = index::merged(self.backend.as_ref(), weekly, now)?;
        self.backend.commit(weekly, &index)
    }

    /// Create an event in `week`, assigning its id and slug
    pub fn create_event(&self, week: WeekKey, draft: EventDraft) -> StorageResult<Event> {
        self.with_week_lock(week, || self.create_locked(week, draft))
    }

    fn create_locked(&self, week: WeekKey, draft: EventDraft) -> StorageResult<Event> {
        if !week.is_week_start() {
            tracing::warn!(week = %week, "Creating an event under a week key that is not a Monday");
        }

        let mut weekly = self.backend.read_week(&week)?;
        let now = self.now();

        let slug = new_event_slug(
            &draft.title,
            draft.venue_name.as_deref(),
            draft.start_date_time,
            &weekly.slugs(),
        );
        let event = Event::from_draft(draft, new_event_id(), slug, now);
        weekly.events.push(event.clone());

        self.persist(&weekly, now)?;

        tracing::info!(week = %week, id = %event.id, slug = %event.slug, "Created event");
        Ok(event)
    }

    /// Patch an event; `None` if `id` is not in `week`
    pub fn update_event(
        &self,
        week: WeekKey,
        id: &str,
        patch: EventPatch,
    ) -> StorageResult<Option<Event>> {
        self.with_week_lock(week, || self.update_locked(week, id, patch))
    }

    fn update_locked(
        &self,
        week: WeekKey,
        id: &str,
        patch: EventPatch,
    ) -> StorageResult<Option<Event>> {
        let mut weekly = self.backend.read_week(&week)?;
        let Some(event) = weekly.events.iter_mut().find(|e| e.id == id) else {
            tracing::debug!(week = %week, id, "Update target not found");
            return Ok(None);
        };

        let now = self.now();
        event.apply(patch);
        event.last_verified_at = Some(now);
        let updated = event.clone();

        self.persist(&weekly, now)?;

        tracing::info!(week = %week, id, slug = %updated.slug, "Updated event");
        Ok(Some(updated))
    }

    /// Remove an event; `false` if it was not there
    pub fn delete_event(&self, week: WeekKey, id: &str) -> StorageResult<bool> {
        self.with_week_lock(week, || self.delete_locked(week, id))
    }

    fn delete_locked(&self, week: WeekKey, id: &str) -> StorageResult<bool> {
        let mut weekly = self.backend.read_week(&week)?;
        let Some(removed) = weekly.remove(id) else {
            tracing::debug!(week = %week, id, "Delete target not found");
            return Ok(false);
        };

        self.persist(&weekly, self.now())?;

        tracing::info!(
            week = %week,
            id,
            slug = %removed.slug,
            remaining = weekly.events.len(),
            "Deleted event"
        );
        Ok(true)
    }

    /// Find an event by slug across indexed weeks, oldest week first
    pub fn find_by_slug(&self, slug: &str) -> StorageResult<Option<(Event, WeekKey)>> {
        let index = self.backend.read_index()?;
        for week in index.keys() {
            let weekly = self.backend.read_week(&week)?;
            if let Some(event) = weekly.find_by_slug(slug) {
                return Ok(Some((event.clone(), week)));
            }
        }
        tracing::debug!(slug, weeks = index.weeks.len(), "Slug not found");
        Ok(None)
    }

    pub fn get_event(&self, week: WeekKey, id: &str) -> StorageResult<Option<Event>> {
        Ok(self.backend.read_week(&week)?.find(id).cloned())
    }

    pub fn read_week(&self, week: WeekKey) -> StorageResult<WeeklyEvents> {
        self.backend.read_week(&week)
    }

    pub fn read_index(&self) -> StorageResult<EventsIndex> {
        self.backend.read_index()
    }

    pub fn is_asset_referenced(&self, url: &str) -> StorageResult<bool> {
        integrity::is_asset_referenced(self.backend.as_ref(), url)
    }

    /// Every stored event pointing at `url`
    pub fn asset_references(&self, url: &str) -> StorageResult<Vec<AssetReference>> {
        integrity::asset_references(self.backend.as_ref(), url)
    }

    pub fn validate_index(&self) -> StorageResult<Vec<IndexIssue>> {
        index::verify(self.backend.as_ref())
    }

    /// Rebuild the index from every stored week
    pub fn rebuild_index(&self) -> StorageResult<EventsIndex> {
        let _index_guard = self.index_lock.lock().map_err(lock_err)?;
        index::rebuild(self.backend.as_ref(), self.clock.as_ref())
    }

    #[cfg(test)]
    fn tracked_week_locks(&self) -> usize {
        self.week_locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}
