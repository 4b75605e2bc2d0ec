//! Payload validation for event writes
//!
//! Checks run before anything reaches the store. Failures are collected per
//! field so the client sees every problem at once.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::storage::{EventDraft, EventImage, EventLinks, EventPatch};

pub const GENRES: [&str; 7] = [
    "music",
    "food",
    "art",
    "sports",
    "family",
    "nightlife",
    "culture",
];

/// Prefix every stored image URL must carry
pub const IMAGE_PREFIX: &str = "/images/";

const MAX_TITLE: usize = 80;
const MAX_DESCRIPTION: usize = 180;
const MAX_VENUE: usize = 100;
const MAX_ADDRESS: usize = 200;
const MAX_SOURCE: usize = 50;

/// Field name → messages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field error
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

struct Checker<'a> {
    cities: &'a [String],
    errors: ValidationErrors,
}

impl<'a> Checker<'a> {
    fn new(cities: &'a [String]) -> Self {
        Self {
            cities,
            errors: ValidationErrors::new(),
        }
    }

    fn max_len(&mut self, field: &str, value: &str, max: usize, label: &str) {
        if value.chars().count() > max {
            self.errors
                .add(field, format!("{label} must be {max} characters or less"));
        }
    }

    fn title(&mut self, title: &str) {
        if title.trim().is_empty() {
            self.errors.add("title", "Title is required");
        }
        self.max_len("title", title, MAX_TITLE, "Title");
    }

    fn city(&mut self, city: &str) {
        if !self.cities.iter().any(|c| c == city) {
            self.errors
                .add("city", "City must be one of the supported cities");
        }
    }

    fn genre(&mut self, genre: &str) {
        if !GENRES.contains(&genre) {
            self.errors
                .add("genre", "Genre must be one of the available types");
        }
    }

    fn price(&mut self, price: Option<f64>) {
        if let Some(p) = price {
            if p <= 0.0 || !p.is_finite() {
                self.errors.add("priceFrom", "Price must be positive");
            }
        }
    }

    fn coordinates(&mut self, lat: Option<f64>, lng: Option<f64>) {
        if lat.is_some_and(|v| !(-90.0..=90.0).contains(&v)) {
            self.errors.add("lat", "Latitude must be between -90 and 90");
        }
        if lng.is_some_and(|v| !(-180.0..=180.0).contains(&v)) {
            self.errors.add("lng", "Longitude must be between -180 and 180");
        }
    }

    fn url(&mut self, field: &str, url: &str, label: &str) {
        let valid = (url.starts_with("https://") || url.starts_with("http://"))
            && url.split("://").nth(1).is_some_and(|rest| !rest.is_empty());
        if !valid {
            self.errors.add(field, format!("{label} must be valid"));
        }
    }

    fn links(&mut self, links: Option<&EventLinks>) {
        if let Some(links) = links {
            if let Some(url) = &links.details {
                self.url("links.details", url, "Details URL");
            }
            if let Some(url) = &links.tickets {
                self.url("links.tickets", url, "Tickets URL");
            }
        }
    }

    fn image(&mut self, field: &str, image: &EventImage) {
        if !image.url.starts_with(IMAGE_PREFIX) {
            self.errors
                .add(field, format!("Image URL must start with {IMAGE_PREFIX}"));
        }
        if image.alt.trim().is_empty() {
            self.errors.add(field, "Alt text is required");
        }
    }

    fn images(&mut self, hero: Option<&EventImage>, gallery: Option<&[EventImage]>) {
        if let Some(hero) = hero {
            self.image("heroImage", hero);
        }
        for image in gallery.unwrap_or_default() {
            self.image("gallery", image);
        }
    }
}

/// Validate fields for a new event
pub fn validate_draft(draft: &EventDraft, cities: &[String]) -> Result<(), ValidationErrors> {
    let mut c = Checker::new(cities);

    c.title(&draft.title);
    c.max_len(
        "descriptionShort",
        &draft.description_short,
        MAX_DESCRIPTION,
        "Description",
    );
    c.city(&draft.city);
    c.genre(&draft.genre);
    if let Some(venue) = &draft.venue_name {
        c.max_len("venueName", venue, MAX_VENUE, "Venue name");
    }
    if let Some(address) = &draft.address {
        c.max_len("address", address, MAX_ADDRESS, "Address");
    }
    c.max_len("source", &draft.source, MAX_SOURCE, "Source");
    c.price(draft.price_from);
    c.coordinates(draft.lat, draft.lng);
    c.links(draft.links.as_ref());
    if let Some(url) = &draft.canonical_url {
        c.url("canonicalUrl", url, "Canonical URL");
    }
    c.images(draft.hero_image.as_ref(), Some(draft.gallery.as_slice()));

    if let Some(end) = draft.end_date_time {
        if end < draft.start_date_time {
            c.errors
                .add("endDateTime", "End date must not be before the start date");
        }
    }

    c.errors.into_result()
}

/// Validate the fields a patch sets; absent fields are not checked
pub fn validate_patch(patch: &EventPatch, cities: &[String]) -> Result<(), ValidationErrors> {
    let mut c = Checker::new(cities);

    if let Some(title) = &patch.title {
        c.title(title);
    }
    if let Some(text) = &patch.description_short {
        c.max_len("descriptionShort", text, MAX_DESCRIPTION, "Description");
    }
    if let Some(city) = &patch.city {
        c.city(city);
    }
    if let Some(genre) = &patch.genre {
        c.genre(genre);
    }
    if let Some(Some(venue)) = &patch.venue_name {
        c.max_len("venueName", venue, MAX_VENUE, "Venue name");
    }
    if let Some(Some(address)) = &patch.address {
        c.max_len("address", address, MAX_ADDRESS, "Address");
    }
    if let Some(source) = &patch.source {
        c.max_len("source", source, MAX_SOURCE, "Source");
    }
    c.price(patch.price_from.flatten());
    c.coordinates(patch.lat.flatten(), patch.lng.flatten());
    c.links(patch.links.as_ref().and_then(Option::as_ref));
    if let Some(Some(url)) = &patch.canonical_url {
        c.url("canonicalUrl", url, "Canonical URL");
    }
    c.images(
        patch.hero_image.as_ref().and_then(Option::as_ref),
        patch.gallery.as_deref(),
    );

    if let (Some(start), Some(Some(end))) = (patch.start_date_time, patch.end_date_time) {
        if end < start {
            c.errors
                .add("endDateTime", "End date must not be before the start date");
        }
    }

    c.errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn cities() -> Vec<String> {
        vec!["San Juan".to_string(), "Ponce".to_string()]
    }

    fn draft() -> EventDraft {
        EventDraft::new(
            "Jazz Night",
            Utc.with_ymd_and_hms(2025, 9, 12, 23, 0, 0).unwrap(),
            "San Juan",
            "music",
            "manual",
        )
    }

    #[test]
    fn test_valid_draft_passes() {
        let d = draft()
            .venue("La Factoría")
            .hero("/images/uploads/events/jazz.jpg", "Band");
        assert!(validate_draft(&d, &cities()).is_ok());
    }

    #[test]
    fn test_draft_errors_are_collected_per_field() {
        let mut d = draft();
        d.title = "x".repeat(81);
        d.city = "Atlantis".to_string();
        d.genre = "opera".to_string();
        d.price_from = Some(0.0);
        d.hero_image = Some(EventImage::new("https://cdn.example.com/a.jpg", ""));
        d.end_date_time = Some(Utc.with_ymd_and_hms(2025, 9, 12, 22, 0, 0).unwrap());

        let errors = validate_draft(&d, &cities()).unwrap_err();
        assert!(errors.get("title").is_some());
        assert!(errors.get("city").is_some());
        assert!(errors.get("genre").is_some());
        assert!(errors.get("priceFrom").is_some());
        assert_eq!(errors.get("heroImage").map(|m| m.len()), Some(2));
        assert!(errors.get("endDateTime").is_some());
        assert!(errors.get("source").is_none());
    }

    #[test]
    fn test_blank_title_and_bad_links() {
        let mut d = draft();
        d.title = "   ".to_string();
        d.links = Some(EventLinks {
            details: Some("not a url".to_string()),
            tickets: Some("https://tickets.example.com/jazz".to_string()),
        });

        let errors = validate_draft(&d, &cities()).unwrap_err();
        assert_eq!(errors.get("title"), Some(&["Title is required".to_string()][..]));
        assert!(errors.get("links.details").is_some());
        assert!(errors.get("links.tickets").is_none());
    }

    #[test]
    fn test_patch_checks_only_present_fields() {
        assert!(validate_patch(&EventPatch::default(), &cities()).is_ok());

        let patch: EventPatch = serde_json::from_value(serde_json::json!({
            "slug": "ignored-anyway",
            "city": "Ponce",
            "venueName": null,
            "priceFrom": null
        }))
        .unwrap();
        assert!(validate_patch(&patch, &cities()).is_ok());

        let patch: EventPatch =
            serde_json::from_value(serde_json::json!({ "genre": "opera", "source": "" }))
                .unwrap();
        let errors = validate_patch(&patch, &cities()).unwrap_err();
        assert!(errors.get("genre").is_some());
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let errors = ValidationErrors::field("title", "Title is required");
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value, serde_json::json!({ "title": ["Title is required"] }));
        assert_eq!(errors.to_string(), "title: Title is required");
    }
}
