//! Relational backend (SQLite)
//!
//! A week is the set of `events` rows sharing a `week_start` value; row
//! order within a week is kept in `position`. The index is materialized in
//! `event_weeks` so reads never aggregate. Every write runs in a single
//! transaction, and `commit` writes a week and the index in the same one.
//!
//! Rows are keyed by a surrogate `row_id`. Event ids and sponsor targets
//! carry no constraints, so any week the file backend accepts is accepted
//! here too.

use crate::storage::backend::{BackendKind, EventBackend, WeekScan};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::timefmt;
use crate::storage::types::{
    Event, EventImage, EventLinks, EventStatus, EventsIndex, Placement, Sponsor, WeekSummary,
    WeeklyEvents,
};
use crate::storage::week::WeekKey;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS event_weeks (
        week_start TEXT PRIMARY KEY,
        event_count INTEGER NOT NULL DEFAULT 0,
        cities TEXT NOT NULL DEFAULT '[]',
        genres TEXT NOT NULL DEFAULT '[]',
        last_updated TEXT NOT NULL,
        prev_week TEXT,
        next_week TEXT
    );

    CREATE TABLE IF NOT EXISTS events (
        row_id INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL,
        week_start TEXT NOT NULL,
        position INTEGER NOT NULL,
        slug TEXT NOT NULL,
        title TEXT NOT NULL,
        description_short TEXT NOT NULL,
        start_datetime TEXT NOT NULL,
        end_datetime TEXT,
        timezone TEXT NOT NULL,
        city TEXT NOT NULL,
        venue_name TEXT,
        address TEXT,
        lat REAL,
        lng REAL,
        genre TEXT NOT NULL,
        free INTEGER NOT NULL DEFAULT 0,
        price_from REAL,
        age_restriction TEXT,
        details_url TEXT,
        tickets_url TEXT,
        canonical_url TEXT,
        status TEXT NOT NULL DEFAULT 'scheduled',
        source TEXT NOT NULL,
        last_verified_at TEXT,
        sponsor_placement TEXT
    );

    CREATE INDEX IF NOT EXISTS events_week_idx ON events(week_start, position);
    CREATE INDEX IF NOT EXISTS events_slug_idx ON events(slug);
    CREATE INDEX IF NOT EXISTS events_id_idx ON events(id);

    CREATE TABLE IF NOT EXISTS event_images (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_row INTEGER NOT NULL REFERENCES events(row_id) ON DELETE CASCADE,
        url TEXT NOT NULL,
        alt TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'gallery',
        position INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS event_images_event_idx ON event_images(event_row);

    CREATE TABLE IF NOT EXISTS event_sponsors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        week_start TEXT NOT NULL,
        event_id TEXT NOT NULL,
        placement TEXT NOT NULL,
        position INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS event_sponsors_week_idx ON event_sponsors(week_start);
";

const EVENT_COLUMNS: &str = "id, slug, title, description_short, start_datetime, end_datetime,
    timezone, city, venue_name, address, lat, lng, genre, free, price_from, age_restriction,
    details_url, tickets_url, canonical_url, status, source, last_verified_at, sponsor_placement";

/// SQLite-backed event storage
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open or create a database file
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            ",
        )?;
        Self::init(conn)
    }

    /// Private in-memory database
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(format!("Failed to acquire database lock: {}", e)))
    }

    /// Week keys that have at least one event row
    fn stored_weeks(&self) -> StorageResult<Vec<WeekKey>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare_cached("SELECT DISTINCT week_start FROM events ORDER BY week_start")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        keys.iter().map(|k| k.parse()).collect()
    }
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    timefmt::parse(&raw).map_err(|e| conversion_error(idx, e))
}

fn optional_ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|v| timefmt::parse(&v).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn week_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<WeekKey> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

fn optional_week_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<WeekKey>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|v| v.parse().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn json_list_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn unknown_value(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    conversion_error(
        idx,
        StorageError::Serialization(format!("unknown {what} '{value}'")),
    )
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let details: Option<String> = row.get(16)?;
    let tickets: Option<String> = row.get(17)?;
    let links = EventLinks { details, tickets };

    let status_raw: String = row.get(19)?;
    let status =
        EventStatus::parse(&status_raw).ok_or_else(|| unknown_value(19, "status", &status_raw))?;

    let placement_raw: Option<String> = row.get(22)?;
    let sponsor_placement = placement_raw
        .map(|raw| Placement::parse(&raw).ok_or_else(|| unknown_value(22, "placement", &raw)))
        .transpose()?;

    Ok(Event {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        description_short: row.get(3)?,
        start_date_time: ts_column(row, 4)?,
        end_date_time: optional_ts_column(row, 5)?,
        timezone: row.get(6)?,
        city: row.get(7)?,
        venue_name: row.get(8)?,
        address: row.get(9)?,
        lat: row.get(10)?,
        lng: row.get(11)?,
        genre: row.get(12)?,
        free: row.get(13)?,
        price_from: row.get(14)?,
        age_restriction: row.get(15)?,
        links: if links.is_empty() { None } else { Some(links) },
        canonical_url: row.get(18)?,
        hero_image: None,
        gallery: Vec::new(),
        status,
        source: row.get(20)?,
        sponsor_placement,
        last_verified_at: optional_ts_column(row, 21)?,
    })
}

fn read_week_from(conn: &Connection, week: &WeekKey) -> StorageResult<WeeklyEvents> {
    let key = week.to_string();

    let mut rows: Vec<(i64, Event)> = {
        let sql = format!(
            "SELECT {EVENT_COLUMNS}, row_id FROM events WHERE week_start = ?1 ORDER BY position"
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![key], |row| Ok((row.get::<_, i64>(23)?, event_from_row(row)?)))?;
        rows.collect::<Result<_, _>>()?
    };

    if rows.is_empty() {
        return Ok(WeeklyEvents::empty(*week));
    }

    let mut media: HashMap<i64, Vec<(String, EventImage)>> = HashMap::new();
    {
        let mut stmt = conn.prepare_cached(
            "SELECT i.event_row, i.role, i.url, i.alt FROM event_images i
             JOIN events e ON e.row_id = i.event_row
             WHERE e.week_start = ?1
             ORDER BY i.event_row, i.position",
        )?;
        let rows = stmt.query_map(params![key], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                EventImage {
                    url: row.get(2)?,
                    alt: row.get(3)?,
                },
            ))
        })?;
        for row in rows {
            let (event_row, role, image) = row?;
            media.entry(event_row).or_default().push((role, image));
        }
    }

    for (row_id, event) in &mut rows {
        if let Some(images) = media.remove(row_id) {
            for (role, image) in images {
                if role == "hero" {
                    event.hero_image = Some(image);
                } else {
                    event.gallery.push(image);
                }
            }
        }
    }

    let sponsors = {
        let mut stmt = conn.prepare_cached(
            "SELECT placement, event_id FROM event_sponsors
             WHERE week_start = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![key], |row| {
            let raw: String = row.get(0)?;
            let placement =
                Placement::parse(&raw).ok_or_else(|| unknown_value(0, "placement", &raw))?;
            Ok(Sponsor {
                placement,
                event_id: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    Ok(WeeklyEvents {
        week_start_date: *week,
        events: rows.into_iter().map(|(_, event)| event).collect(),
        sponsors,
    })
}

fn write_week_to(conn: &Connection, week: &WeeklyEvents) -> StorageResult<()> {
    let key = week.week_start_date.to_string();

    // Images go with their events via ON DELETE CASCADE
    conn.execute("DELETE FROM event_sponsors WHERE week_start = ?1", params![key])?;
    conn.execute("DELETE FROM events WHERE week_start = ?1", params![key])?;

    let mut insert_event = conn.prepare_cached(
        "INSERT INTO events (id, week_start, position, slug, title, description_short,
            start_datetime, end_datetime, timezone, city, venue_name, address, lat, lng, genre,
            free, price_from, age_restriction, details_url, tickets_url, canonical_url, status,
            source, last_verified_at, sponsor_placement)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
            ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
    )?;
    let mut insert_image = conn.prepare_cached(
        "INSERT INTO event_images (event_row, url, alt, role, position)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    for (position, event) in week.events.iter().enumerate() {
        let links = event.links.clone().unwrap_or_default();
        let row_id = insert_event.insert(params![
            event.id,
            key,
            position as i64,
            event.slug,
            event.title,
            event.description_short,
            timefmt::format(&event.start_date_time),
            event.end_date_time.as_ref().map(timefmt::format),
            event.timezone,
            event.city,
            event.venue_name,
            event.address,
            event.lat,
            event.lng,
            event.genre,
            event.free,
            event.price_from,
            event.age_restriction,
            links.details,
            links.tickets,
            event.canonical_url,
            event.status.as_str(),
            event.source,
            event.last_verified_at.as_ref().map(timefmt::format),
            event.sponsor_placement.map(|p| p.as_str()),
        ])?;

        if let Some(hero) = &event.hero_image {
            insert_image.execute(params![row_id, hero.url, hero.alt, "hero", 0i64])?;
        }
        for (i, image) in event.gallery.iter().enumerate() {
            insert_image.execute(params![
                row_id,
                image.url,
                image.alt,
                "gallery",
                i as i64 + 1
            ])?;
        }
    }

    let mut insert_sponsor = conn.prepare_cached(
        "INSERT INTO event_sponsors (week_start, event_id, placement, position)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, sponsor) in week.sponsors.iter().enumerate() {
        insert_sponsor.execute(params![
            key,
            sponsor.event_id,
            sponsor.placement.as_str(),
            position as i64
        ])?;
    }

    Ok(())
}

fn write_index_to(conn: &Connection, index: &EventsIndex) -> StorageResult<()> {
    conn.execute("DELETE FROM event_weeks", [])?;

    let mut insert = conn.prepare_cached(
        "INSERT INTO event_weeks
            (week_start, event_count, cities, genres, last_updated, prev_week, next_week)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for week in &index.weeks {
        insert.execute(params![
            week.start_date.to_string(),
            week.event_count as i64,
            serde_json::to_string(&week.cities)?,
            serde_json::to_string(&week.genres)?,
            timefmt::format(&week.last_updated),
            week.prev.map(|k| k.to_string()),
            week.next.map(|k| k.to_string()),
        ])?;
    }
    Ok(())
}

impl EventBackend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    fn read_week(&self, week: &WeekKey) -> StorageResult<WeeklyEvents> {
        let conn = self.lock()?;
        read_week_from(&conn, week)
    }

    fn write_week(&self, week: &WeeklyEvents) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        write_week_to(&tx, week)?;
        tx.commit()?;
        tracing::debug!(week = %week.week_start_date, events = week.events.len(), "Wrote week rows");
        Ok(())
    }

    fn read_index(&self) -> StorageResult<EventsIndex> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT week_start, event_count, cities, genres, last_updated, prev_week, next_week
             FROM event_weeks ORDER BY week_start",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(WeekSummary {
                start_date: week_column(row, 0)?,
                event_count: row.get::<_, i64>(1)? as usize,
                cities: json_list_column(row, 2)?,
                genres: json_list_column(row, 3)?,
                last_updated: ts_column(row, 4)?,
                prev: optional_week_column(row, 5)?,
                next: optional_week_column(row, 6)?,
            })
        })?;
        let weeks = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(EventsIndex { weeks })
    }

    fn write_index(&self, index: &EventsIndex) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        write_index_to(&tx, index)?;
        tx.commit()?;
        Ok(())
    }

    fn scan_weeks(&self) -> StorageResult<WeekScan<'_>> {
        let weeks = self.stored_weeks()?;
        Ok(Box::new(weeks.into_iter().map(move |week| self.read_week(&week))))
    }

    fn commit(&self, week: &WeeklyEvents, index: &EventsIndex) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        write_week_to(&tx, week)?;
        write_index_to(&tx, index)?;
        tx.commit()?;
        tracing::debug!(week = %week.week_start_date, "Committed week and index rows");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::EventDraft;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn key(s: &str) -> WeekKey {
        s.parse().unwrap()
    }

    fn full_event(id: &str, slug: &str) -> Event {
        let mut draft = EventDraft::new(
            "Bomba Workshop",
            Utc.with_ymd_and_hms(2025, 9, 10, 22, 0, 0).unwrap(),
            "Caguas",
            "culture",
            "partner",
        )
        .venue("Plaza Pública")
        .description("Learn the basics")
        .hero("/images/uploads/events/bomba.jpg", "Drummers")
        .gallery_image("/images/uploads/events/bomba-1.jpg", "Dancers")
        .gallery_image("/images/uploads/events/bomba-2.jpg", "Crowd");
        draft.end_date_time = Some(Utc.with_ymd_and_hms(2025, 9, 11, 1, 0, 0).unwrap());
        draft.lat = Some(18.2341);
        draft.lng = Some(-66.0485);
        draft.price_from = Some(15.0);
        draft.links = Some(EventLinks {
            details: Some("https://example.com/bomba".to_string()),
            tickets: None,
        });
        draft.status = EventStatus::Postponed;
        Event::from_draft(
            draft,
            id.to_string(),
            slug.to_string(),
            Utc.with_ymd_and_hms(2025, 9, 1, 8, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_missing_week_reads_empty() {
        let backend = SqliteBackend::in_memory().unwrap();
        let week = backend.read_week(&key("2025-09-08")).unwrap();
        assert!(week.is_empty());
        assert!(backend.read_index().unwrap().is_empty());
    }

    #[test]
    fn test_week_round_trip_all_fields() {
        let backend = SqliteBackend::in_memory().unwrap();

        let mut week = WeeklyEvents::empty(key("2025-09-08"));
        week.events.push(full_event("z", "bomba-workshop"));
        week.events.push(full_event("a", "bomba-workshop-plaza-pblica"));
        week.events[1].sponsor_placement = Some(Placement::Featured);
        week.sponsors.push(Sponsor {
            placement: Placement::Featured,
            event_id: "a".to_string(),
        });
        backend.write_week(&week).unwrap();

        assert_eq!(backend.read_week(&key("2025-09-08")).unwrap(), week);
    }

    #[test]
    fn test_accepts_what_the_file_backend_accepts() {
        let backend = SqliteBackend::in_memory().unwrap();

        // Same id in two weeks, twice in one week, and a sponsor slot
        // pointing at an id that is not stored
        let mut first = WeeklyEvents::empty(key("2025-09-08"));
        first.events.push(full_event("same-id", "one"));
        first.events.push(full_event("same-id", "two"));
        first.sponsors.push(Sponsor {
            placement: Placement::Hero,
            event_id: "gone".to_string(),
        });
        let mut second = WeeklyEvents::empty(key("2025-09-15"));
        second.events.push(full_event("same-id", "one"));

        backend.write_week(&first).unwrap();
        backend.write_week(&second).unwrap();

        assert_eq!(backend.read_week(&key("2025-09-08")).unwrap(), first);
        assert_eq!(backend.read_week(&key("2025-09-15")).unwrap(), second);

        // Rewriting one week leaves the other week's rows and images alone
        backend.write_week(&WeeklyEvents::empty(key("2025-09-08"))).unwrap();
        assert_eq!(backend.read_week(&key("2025-09-15")).unwrap(), second);
    }

    #[test]
    fn test_rewrite_replaces_previous_rows() {
        let backend = SqliteBackend::in_memory().unwrap();

        let mut week = WeeklyEvents::empty(key("2025-09-08"));
        week.events.push(full_event("a", "one"));
        week.events.push(full_event("b", "two"));
        backend.write_week(&week).unwrap();

        week.remove("a");
        backend.write_week(&week).unwrap();

        let stored = backend.read_week(&key("2025-09-08")).unwrap();
        assert_eq!(stored.events.len(), 1);
        assert_eq!(stored.events[0].id, "b");

        let conn = backend.lock().unwrap();
        let events: i64 = conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
            .unwrap();
        let images: i64 = conn
            .query_row("SELECT COUNT(*) FROM event_images", [], |row| row.get(0))
            .unwrap();
        assert_eq!(events, 1);
        // hero plus two gallery images of the remaining event
        assert_eq!(images, 3);
    }

    #[test]
    fn test_weeks_are_isolated() {
        let backend = SqliteBackend::in_memory().unwrap();

        let mut first = WeeklyEvents::empty(key("2025-09-08"));
        first.events.push(full_event("a", "one"));
        let mut second = WeeklyEvents::empty(key("2025-09-15"));
        second.events.push(full_event("b", "one"));
        backend.write_week(&first).unwrap();
        backend.write_week(&second).unwrap();

        backend.write_week(&WeeklyEvents::empty(key("2025-09-08"))).unwrap();
        assert!(backend.read_week(&key("2025-09-08")).unwrap().is_empty());
        assert_eq!(backend.read_week(&key("2025-09-15")).unwrap(), second);

        let scanned: Vec<WeekKey> = backend
            .scan_weeks()
            .unwrap()
            .map(|w| w.unwrap().week_start_date)
            .collect();
        assert_eq!(scanned, vec![key("2025-09-15")]);
    }

    #[test]
    fn test_failed_commit_rolls_back_week() {
        let backend = SqliteBackend::in_memory().unwrap();

        let mut week = WeeklyEvents::empty(key("2025-09-08"));
        week.events.push(full_event("a", "one"));

        // A repeated week key violates the index primary key after the week rows are in
        let summary = WeekSummary {
            start_date: key("2025-09-08"),
            event_count: 1,
            cities: vec!["Caguas".to_string()],
            genres: vec!["culture".to_string()],
            last_updated: Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
            prev: None,
            next: None,
        };
        let index = EventsIndex {
            weeks: vec![summary.clone(), summary],
        };

        assert!(backend.commit(&week, &index).is_err());
        assert!(backend.read_week(&key("2025-09-08")).unwrap().is_empty());
        assert!(backend.read_index().unwrap().is_empty());
    }

    #[test]
    fn test_index_round_trip() {
        let backend = SqliteBackend::in_memory().unwrap();
        let ts = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let index = EventsIndex {
            weeks: vec![
                WeekSummary {
                    start_date: key("2025-09-08"),
                    event_count: 1,
                    cities: vec!["Caguas".to_string()],
                    genres: vec!["culture".to_string()],
                    last_updated: ts,
                    prev: None,
                    next: Some(key("2025-09-22")),
                },
                WeekSummary {
                    start_date: key("2025-09-22"),
                    event_count: 3,
                    cities: vec!["Ponce".to_string(), "San Juan".to_string()],
                    genres: vec!["food".to_string(), "music".to_string()],
                    last_updated: ts,
                    prev: Some(key("2025-09-08")),
                    next: None,
                },
            ],
        };
        backend.write_index(&index).unwrap();
        assert_eq!(backend.read_index().unwrap(), index);

        backend.write_index(&EventsIndex::default()).unwrap();
        assert!(backend.read_index().unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db").join("events.sqlite");

        let mut week = WeeklyEvents::empty(key("2025-09-08"));
        week.events.push(full_event("a", "one"));
        {
            let backend = SqliteBackend::open(&path).unwrap();
            backend.write_week(&week).unwrap();
        }

        let backend = SqliteBackend::open(&path).unwrap();
        assert_eq!(backend.read_week(&key("2025-09-08")).unwrap(), week);
    }
}
