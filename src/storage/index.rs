//! Week index maintenance
//!
//! The index holds one `WeekSummary` per non-empty week, sorted by
//! `start_date`, with `prev`/`next` pointing at the neighbouring entries.
//! Summaries are derived from week contents; nothing else writes them.

use crate::storage::backend::EventBackend;
use crate::storage::clock::Clock;
use crate::storage::error::StorageResult;
use crate::storage::timefmt;
use crate::storage::types::{EventsIndex, WeekSummary, WeeklyEvents};
use crate::storage::week::WeekKey;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Summarize a week; `None` when it holds no events
pub fn summarize(week: &WeeklyEvents, now: DateTime<Utc>) -> Option<WeekSummary> {
    if week.is_empty() {
        return None;
    }

    let cities: BTreeSet<&str> = week.events.iter().map(|e| e.city.as_str()).collect();
    let genres: BTreeSet<&str> = week.events.iter().map(|e| e.genre.as_str()).collect();

    Some(WeekSummary {
        start_date: week.week_start_date,
        event_count: week.events.len(),
        cities: cities.into_iter().map(String::from).collect(),
        genres: genres.into_iter().map(String::from).collect(),
        last_updated: timefmt::truncate(now),
        prev: None,
        next: None,
    })
}

/// Merge one week's summary into the index.
///
/// A new week is inserted in order, an existing one is replaced, and
/// `None` removes the week. The chain is relinked afterwards.
pub fn apply(index: &mut EventsIndex, week: WeekKey, summary: Option<WeekSummary>) {
    normalize(index);

    match (
        index.weeks.binary_search_by(|w| w.start_date.cmp(&week)),
        summary,
    ) {
        (Ok(pos), Some(mut summary)) => {
            summary.start_date = week;
            index.weeks[pos] = summary;
        }
        (Err(pos), Some(mut summary)) => {
            summary.start_date = week;
            index.weeks.insert(pos, summary);
        }
        (Ok(pos), None) => {
            index.weeks.remove(pos);
        }
        (Err(_), None) => {}
    }

    relink(index);
}

/// Sort by week and drop duplicate entries (keeps the first)
fn normalize(index: &mut EventsIndex) {
    index.weeks.sort_by_key(|w| w.start_date);
    index.weeks.dedup_by_key(|w| w.start_date);
}

/// Point every entry at its chronological neighbours
fn relink(index: &mut EventsIndex) {
    let keys: Vec<WeekKey> = index.weeks.iter().map(|w| w.start_date).collect();
    for (i, entry) in index.weeks.iter_mut().enumerate() {
        entry.prev = i.checked_sub(1).map(|p| keys[p]);
        entry.next = keys.get(i + 1).copied();
    }
}

/// Index as it should look once `week` is merged in (nothing is written)
pub fn merged(
    backend: &dyn EventBackend,
    week: &WeeklyEvents,
    now: DateTime<Utc>,
) -> StorageResult<EventsIndex> {
    let mut index = backend.read_index()?;
    apply(&mut index, week.week_start_date, summarize(week, now));
    Ok(index)
}

/// Re-derive one week's entry from stored data and persist the index.
///
/// Returns the new entry, or `None` when the week is empty and was removed.
pub fn recompute(
    backend: &dyn EventBackend,
    week: &WeekKey,
    clock: &dyn Clock,
) -> StorageResult<Option<WeekSummary>> {
    let stored = backend.read_week(week)?;
    let index = merged(backend, &stored, clock.now())?;
    backend.write_index(&index)?;

    tracing::debug!(week = %week, events = stored.events.len(), "Recomputed week summary");
    Ok(index.get(week).cloned())
}

/// Rebuild the whole index from every stored week
pub fn rebuild(backend: &dyn EventBackend, clock: &dyn Clock) -> StorageResult<EventsIndex> {
    let now = clock.now();
    let mut index = EventsIndex::default();
    for week in backend.scan_weeks()? {
        if let Some(summary) = summarize(&week?, now) {
            index.weeks.push(summary);
        }
    }
    normalize(&mut index);
    relink(&mut index);
    backend.write_index(&index)?;

    tracing::info!(
        weeks = index.weeks.len(),
        events = index.total_events(),
        "Rebuilt week index"
    );
    Ok(index)
}

/// Disagreement between the index and stored weeks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexIssue {
    /// Week has events but no index entry
    MissingEntry { week: WeekKey, stored: usize },
    /// Index entry for a week with no events
    StaleEntry { week: WeekKey },
    CountMismatch {
        week: WeekKey,
        indexed: usize,
        stored: usize,
    },
    CitiesMismatch { week: WeekKey },
    GenresMismatch { week: WeekKey },
    /// Entries not strictly ascending by week
    OutOfOrder { week: WeekKey },
    BrokenLink {
        week: WeekKey,
        link: &'static str,
        expected: Option<WeekKey>,
        found: Option<WeekKey>,
    },
}

impl fmt::Display for IndexIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(key: &Option<WeekKey>) -> String {
            key.map(|k| k.to_string()).unwrap_or_else(|| "none".to_string())
        }

        match self {
            IndexIssue::MissingEntry { week, stored } => {
                write!(f, "{week}: {stored} stored events but no index entry")
            }
            IndexIssue::StaleEntry { week } => write!(f, "{week}: indexed but holds no events"),
            IndexIssue::CountMismatch {
                week,
                indexed,
                stored,
            } => write!(f, "{week}: index counts {indexed} events, {stored} stored"),
            IndexIssue::CitiesMismatch { week } => write!(f, "{week}: city list is stale"),
            IndexIssue::GenresMismatch { week } => write!(f, "{week}: genre list is stale"),
            IndexIssue::OutOfOrder { week } => write!(f, "{week}: entry out of order"),
            IndexIssue::BrokenLink {
                week,
                link,
                expected,
                found,
            } => write!(
                f,
                "{week}: {link} is {} but should be {}",
                show(found),
                show(expected)
            ),
        }
    }
}

/// Compare the stored index against the weeks actually on the backend
pub fn verify(backend: &dyn EventBackend) -> StorageResult<Vec<IndexIssue>> {
    let index = backend.read_index()?;
    let mut issues = Vec::new();

    for pair in index.weeks.windows(2) {
        if pair[0].start_date >= pair[1].start_date {
            issues.push(IndexIssue::OutOfOrder {
                week: pair[1].start_date,
            });
        }
    }

    for (i, entry) in index.weeks.iter().enumerate() {
        let expected_prev = i.checked_sub(1).map(|p| index.weeks[p].start_date);
        let expected_next = index.weeks.get(i + 1).map(|w| w.start_date);
        if entry.prev != expected_prev {
            issues.push(IndexIssue::BrokenLink {
                week: entry.start_date,
                link: "prev",
                expected: expected_prev,
                found: entry.prev,
            });
        }
        if entry.next != expected_next {
            issues.push(IndexIssue::BrokenLink {
                week: entry.start_date,
                link: "next",
                expected: expected_next,
                found: entry.next,
            });
        }
    }

    let mut stored: BTreeMap<WeekKey, WeeklyEvents> = BTreeMap::new();
    for week in backend.scan_weeks()? {
        let week = week?;
        if !week.is_empty() {
            stored.insert(week.week_start_date, week);
        }
    }

    for entry in &index.weeks {
        let week = entry.start_date;
        let Some(actual) = stored.get(&week).and_then(|w| summarize(w, entry.last_updated)) else {
            issues.push(IndexIssue::StaleEntry { week });
            continue;
        };
        if entry.event_count != actual.event_count {
            issues.push(IndexIssue::CountMismatch {
                week,
                indexed: entry.event_count,
                stored: actual.event_count,
            });
        }
        if entry.cities != actual.cities {
            issues.push(IndexIssue::CitiesMismatch { week });
        }
        if entry.genres != actual.genres {
            issues.push(IndexIssue::GenresMismatch { week });
        }
    }

    for (week, events) in &stored {
        if index.get(week).is_none() {
            issues.push(IndexIssue::MissingEntry {
                week: *week,
                stored: events.events.len(),
            });
        }
    }

    if !issues.is_empty() {
        tracing::warn!(issues = issues.len(), "Week index disagrees with stored weeks");
    }
    Ok(issues)
}
