//! Core data types for the event store
//!
//! - `Event`: a single listing; `id` and `slug` never change once assigned
//! - `EventDraft` / `EventPatch`: creation fields and partial updates
//! - `WeeklyEvents`: every event stored under one `WeekKey`
//! - `WeekSummary` / `EventsIndex`: the derived per-week index
//!
//! JSON field names are camelCase to stay compatible with existing data files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::storage::timefmt;
use crate::storage::week::WeekKey;

pub const DEFAULT_TIMEZONE: &str = "America/Puerto_Rico";

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Publication state of an event
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Scheduled,
    Canceled,
    Postponed,
    SoldOut,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "scheduled",
            EventStatus::Canceled => "canceled",
            EventStatus::Postponed => "postponed",
            EventStatus::SoldOut => "sold_out",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(EventStatus::Scheduled),
            "canceled" => Some(EventStatus::Canceled),
            "postponed" => Some(EventStatus::Postponed),
            "sold_out" => Some(EventStatus::SoldOut),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media reference (hero or gallery image)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventImage {
    pub url: String,
    pub alt: String,
}

impl EventImage {
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: alt.into(),
        }
    }
}

/// Outbound links
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<String>,
}

impl EventLinks {
    pub fn is_empty(&self) -> bool {
        self.details.is_none() && self.tickets.is_none()
    }
}

/// Drop link objects that carry no links, so every backend stores them alike
fn normalize_links(links: Option<EventLinks>) -> Option<EventLinks> {
    links.filter(|l| !l.is_empty())
}

/// A single event listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description_short: String,
    #[serde(with = "timefmt")]
    pub start_date_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timefmt::option")]
    pub end_date_time: Option<DateTime<Utc>>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub genre: String,
    #[serde(default)]
    pub free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<EventLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<EventImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<EventImage>,
    #[serde(default)]
    pub status: EventStatus,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor_placement: Option<Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timefmt::option")]
    pub last_verified_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Build a stored event from creation fields and an assigned identity
    pub fn from_draft(
        draft: EventDraft,
        id: String,
        slug: String,
        verified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            slug,
            title: draft.title,
            description_short: draft.description_short,
            start_date_time: timefmt::truncate(draft.start_date_time),
            end_date_time: draft.end_date_time.map(timefmt::truncate),
            timezone: draft.timezone,
            city: draft.city,
            venue_name: draft.venue_name,
            address: draft.address,
            lat: draft.lat,
            lng: draft.lng,
            genre: draft.genre,
            free: draft.free,
            price_from: draft.price_from,
            age_restriction: draft.age_restriction,
            links: normalize_links(draft.links),
            canonical_url: draft.canonical_url,
            hero_image: draft.hero_image,
            gallery: draft.gallery,
            status: draft.status,
            source: draft.source,
            sponsor_placement: draft.sponsor_placement,
            last_verified_at: Some(timefmt::truncate(verified_at)),
        }
    }

    /// Merge a patch onto this event.
    ///
    /// `id` and `slug` in the patch are discarded. The caller refreshes
    /// `last_verified_at`.
    pub fn apply(&mut self, patch: EventPatch) {
        let EventPatch {
            id: _,
            slug: _,
            title,
            description_short,
            start_date_time,
            end_date_time,
            timezone,
            city,
            venue_name,
            address,
            lat,
            lng,
            genre,
            free,
            price_from,
            age_restriction,
            links,
            canonical_url,
            hero_image,
            gallery,
            status,
            source,
            sponsor_placement,
        } = patch;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = description_short {
            self.description_short = v;
        }
        if let Some(v) = start_date_time {
            self.start_date_time = timefmt::truncate(v);
        }
        if let Some(v) = end_date_time {
            self.end_date_time = v.map(timefmt::truncate);
        }
        if let Some(v) = timezone {
            self.timezone = v;
        }
        if let Some(v) = city {
            self.city = v;
        }
        if let Some(v) = venue_name {
            self.venue_name = v;
        }
        if let Some(v) = address {
            self.address = v;
        }
        if let Some(v) = lat {
            self.lat = v;
        }
        if let Some(v) = lng {
            self.lng = v;
        }
        if let Some(v) = genre {
            self.genre = v;
        }
        if let Some(v) = free {
            self.free = v;
        }
        if let Some(v) = price_from {
            self.price_from = v;
        }
        if let Some(v) = age_restriction {
            self.age_restriction = v;
        }
        if let Some(v) = links {
            self.links = normalize_links(v);
        }
        if let Some(v) = canonical_url {
            self.canonical_url = v;
        }
        if let Some(v) = hero_image {
            self.hero_image = v;
        }
        if let Some(v) = gallery {
            self.gallery = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = source {
            self.source = v;
        }
        if let Some(v) = sponsor_placement {
            self.sponsor_placement = v;
        }
    }

    /// Every media URL this event points at
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.hero_image
            .iter()
            .chain(self.gallery.iter())
            .map(|img| img.url.as_str())
    }

}

/// Fields supplied when creating an event (identity is assigned by the store)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description_short: String,
    #[serde(with = "timefmt")]
    pub start_date_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timefmt::option")]
    pub end_date_time: Option<DateTime<Utc>>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub genre: String,
    #[serde(default)]
    pub free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<EventLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<EventImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<EventImage>,
    #[serde(default)]
    pub status: EventStatus,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor_placement: Option<Placement>,
}

impl EventDraft {
    /// Create a draft with the required fields
    pub fn new(
        title: impl Into<String>,
        start_date_time: DateTime<Utc>,
        city: impl Into<String>,
        genre: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description_short: String::new(),
            start_date_time,
            end_date_time: None,
            timezone: default_timezone(),
            city: city.into(),
            venue_name: None,
            address: None,
            lat: None,
            lng: None,
            genre: genre.into(),
            free: false,
            price_from: None,
            age_restriction: None,
            links: None,
            canonical_url: None,
            hero_image: None,
            gallery: Vec::new(),
            status: EventStatus::Scheduled,
            source: source.into(),
            sponsor_placement: None,
        }
    }

    /// Builder method: set venue
    pub fn venue(mut self, venue: impl Into<String>) -> Self {
        self.venue_name = Some(venue.into());
        self
    }

    /// Builder method: set short description
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description_short = text.into();
        self
    }

    /// Builder method: set hero image
    pub fn hero(mut self, url: impl Into<String>, alt: impl Into<String>) -> Self {
        self.hero_image = Some(EventImage::new(url, alt));
        self
    }

    /// Builder method: add a gallery image
    pub fn gallery_image(mut self, url: impl Into<String>, alt: impl Into<String>) -> Self {
        self.gallery.push(EventImage::new(url, alt));
        self
    }
}

/// Partial update for an event.
///
/// Nullable fields use `Option<Option<T>>`: outer `None` leaves the field
/// alone, `Some(None)` clears it. `id` and `slug` are accepted so callers can
/// echo a whole event back, but they are never applied.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description_short: Option<String>,
    #[serde(default, deserialize_with = "timefmt::option::deserialize")]
    pub start_date_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timefmt::patch::deserialize")]
    pub end_date_time: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub venue_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lng: Option<Option<f64>>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub free: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub price_from: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub age_restriction: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub links: Option<Option<EventLinks>>,
    #[serde(default, deserialize_with = "double_option")]
    pub canonical_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub hero_image: Option<Option<EventImage>>,
    #[serde(default)]
    pub gallery: Option<Vec<EventImage>>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub sponsor_placement: Option<Option<Placement>>,
}

/// Sponsored slot for a week
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Hero,
    Featured,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Hero => "hero",
            Placement::Featured => "featured",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hero" => Some(Placement::Hero),
            "featured" => Some(Placement::Featured),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    pub placement: Placement,
    pub event_id: String,
}

/// All events stored under one week key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyEvents {
    pub week_start_date: WeekKey,
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sponsors: Vec<Sponsor>,
}

impl WeeklyEvents {
    /// A week with nothing in it (what a missing partition reads as)
    pub fn empty(week: WeekKey) -> Self {
        Self {
            week_start_date: week,
            events: Vec::new(),
            sponsors: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.slug == slug)
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.slug.as_str()).collect()
    }

    /// Remove an event and any sponsor slot pointing at it
    pub fn remove(&mut self, id: &str) -> Option<Event> {
        let pos = self.events.iter().position(|e| e.id == id)?;
        self.sponsors.retain(|s| s.event_id != id);
        Some(self.events.remove(pos))
    }
}

/// Cached summary of one week
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    pub start_date: WeekKey,
    pub event_count: usize,
    pub cities: Vec<String>,
    pub genres: Vec<String>,
    #[serde(with = "timefmt")]
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<WeekKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<WeekKey>,
}

/// Every week summary, sorted by `start_date` and doubly linked
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventsIndex {
    pub weeks: Vec<WeekSummary>,
}

impl EventsIndex {
    pub fn get(&self, week: &WeekKey) -> Option<&WeekSummary> {
        self.weeks.iter().find(|w| &w.start_date == week)
    }

    pub fn keys(&self) -> Vec<WeekKey> {
        self.weeks.iter().map(|w| w.start_date).collect()
    }

    pub fn total_events(&self) -> usize {
        self.weeks.iter().map(|w| w.event_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> Event {
        let draft = EventDraft::new(
            "Jazz Night",
            Utc.with_ymd_and_hms(2025, 9, 12, 23, 0, 0).unwrap(),
            "San Juan",
            "music",
            "manual",
        )
        .venue("La Factoría")
        .hero("/images/uploads/events/jazz.jpg", "Band on stage");
        Event::from_draft(
            draft,
            "id-1".to_string(),
            "jazz-night".to_string(),
            Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_event_json_shape() {
        let value = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(value["descriptionShort"], "");
        assert_eq!(value["startDateTime"], "2025-09-12T23:00:00.000Z");
        assert_eq!(value["lastVerifiedAt"], "2025-09-01T12:00:00.000Z");
        assert_eq!(value["venueName"], "La Factoría");
        assert_eq!(value["status"], "scheduled");
        assert_eq!(value["heroImage"]["url"], "/images/uploads/events/jazz.jpg");
        assert!(value.get("endDateTime").is_none());
        assert!(value.get("gallery").is_none());
        assert!(value.get("links").is_none());
    }

    #[test]
    fn test_event_reads_source_format() {
        let raw = r#"{
            "id": "5d0c8c54-0000-4000-8000-000000000000",
            "slug": "salsa-sunday",
            "title": "Salsa Sunday",
            "descriptionShort": "Dance all night",
            "startDateTime": "2025-09-14T22:00:00.000Z",
            "timezone": "America/Puerto_Rico",
            "city": "Ponce",
            "genre": "nightlife",
            "free": true,
            "status": "sold_out",
            "source": "partner",
            "sponsorPlacement": "hero"
        }"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.status, EventStatus::SoldOut);
        assert!(event.free);
        assert!(event.last_verified_at.is_none());
        assert_eq!(event.sponsor_placement, Some(Placement::Hero));

        let written = serde_json::to_value(&event).unwrap();
        assert_eq!(written["sponsorPlacement"], "hero");
        assert!(sample_event().sponsor_placement.is_none());
        assert!(serde_json::to_value(sample_event())
            .unwrap()
            .get("sponsorPlacement")
            .is_none());
    }

    #[test]
    fn test_patch_sets_and_clears_sponsor_placement() {
        let mut event = sample_event();
        event.apply(serde_json::from_str(r#"{"sponsorPlacement": "featured"}"#).unwrap());
        assert_eq!(event.sponsor_placement, Some(Placement::Featured));

        event.apply(serde_json::from_str(r#"{"title": "Jazz"}"#).unwrap());
        assert_eq!(event.sponsor_placement, Some(Placement::Featured));

        event.apply(serde_json::from_str(r#"{"sponsorPlacement": null}"#).unwrap());
        assert!(event.sponsor_placement.is_none());
    }

    #[test]
    fn test_from_draft_keeps_millisecond_precision() {
        let start = Utc.with_ymd_and_hms(2025, 9, 12, 23, 0, 0).unwrap()
            + chrono::Duration::microseconds(250_750);
        let draft = EventDraft::new("Jazz Night", start, "San Juan", "music", "manual");
        let event = Event::from_draft(
            draft,
            "id-1".to_string(),
            "jazz-night".to_string(),
            start,
        );
        assert_eq!(event.start_date_time.timestamp_subsec_nanos(), 250_000_000);
        assert_eq!(event.last_verified_at, Some(event.start_date_time));

        let round_trip: Event =
            serde_json::from_value(serde_json::to_value(&event).unwrap()).unwrap();
        assert_eq!(round_trip, event);
    }

    #[test]
    fn test_apply_ignores_identity_fields() {
        let mut event = sample_event();
        let patch = EventPatch {
            id: Some("other".to_string()),
            slug: Some("hijacked".to_string()),
            title: Some("Late Jazz Night".to_string()),
            ..Default::default()
        };
        event.apply(patch);
        assert_eq!(event.id, "id-1");
        assert_eq!(event.slug, "jazz-night");
        assert_eq!(event.title, "Late Jazz Night");
    }

    #[test]
    fn test_patch_null_clears_and_absent_keeps() {
        let mut event = sample_event();
        let patch: EventPatch =
            serde_json::from_str(r#"{"venueName": null, "address": "Calle San Sebastián"}"#)
                .unwrap();
        event.apply(patch);
        assert!(event.venue_name.is_none());
        assert_eq!(event.address.as_deref(), Some("Calle San Sebastián"));
        assert!(event.hero_image.is_some());
    }

    #[test]
    fn test_empty_links_are_dropped() {
        let mut event = sample_event();
        event.apply(EventPatch {
            links: Some(Some(EventLinks::default())),
            ..Default::default()
        });
        assert!(event.links.is_none());
    }

    #[test]
    fn test_image_urls_cover_hero_and_gallery() {
        let mut event = sample_event();
        event.gallery.push(EventImage::new("/images/uploads/events/a.jpg", "a"));
        let urls: Vec<&str> = event.image_urls().collect();
        assert_eq!(
            urls,
            vec!["/images/uploads/events/jazz.jpg", "/images/uploads/events/a.jpg"]
        );
    }

    #[test]
    fn test_remove_drops_sponsor_slot() {
        let event = sample_event();
        let mut week = WeeklyEvents::empty("2025-09-08".parse().unwrap());
        week.sponsors.push(Sponsor {
            placement: Placement::Hero,
            event_id: event.id.clone(),
        });
        week.events.push(event);

        assert!(week.remove("id-1").is_some());
        assert!(week.sponsors.is_empty());
        assert!(week.remove("id-1").is_none());
    }

    #[test]
    fn test_index_json_omits_missing_links() {
        let index = EventsIndex {
            weeks: vec![WeekSummary {
                start_date: "2025-09-08".parse().unwrap(),
                event_count: 1,
                cities: vec!["San Juan".to_string()],
                genres: vec!["music".to_string()],
                last_updated: Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
                prev: None,
                next: None,
            }],
        };
        let value = serde_json::to_value(&index).unwrap();
        let week = &value["weeks"][0];
        assert_eq!(week["startDate"], "2025-09-08");
        assert_eq!(week["eventCount"], 1);
        assert!(week.get("prev").is_none());
        assert!(week.get("next").is_none());
    }
}
