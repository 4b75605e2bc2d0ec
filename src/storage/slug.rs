//! Identity assignment for new events.
//!
//! Slugs are derived from the title. On a collision within the week the
//! venue and then the start date are appended, and only after that a
//! numeric counter. Uniqueness holds against the slugs passed in; the store
//! serializes writers per week so that set is current.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const FALLBACK_SLUG: &str = "event";
const MAX_SLUG_LEN: usize = 100;

fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_\s-]").expect("valid regex"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_]+").expect("valid regex"))
}

fn dashes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").expect("valid regex"))
}

fn valid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"))
}

/// Convert free text to a URL-safe slug (may be empty)
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let stripped = strip_re().replace_all(&lowered, "");
    let dashed = separator_re().replace_all(&stripped, "-");
    let collapsed = dashes_re().replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}

/// Slugify and cap the length
pub fn sanitize_slug(input: &str) -> String {
    let mut slug = slugify(input);
    if slug.len() > MAX_SLUG_LEN {
        // Only ASCII survives slugify, so byte truncation is safe
        slug.truncate(MAX_SLUG_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }
    slug
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slug.len() <= MAX_SLUG_LEN && valid_re().is_match(slug)
}

/// Derive a slug for a new event that is unused within `existing`.
pub fn new_event_slug(
    title: &str,
    venue: Option<&str>,
    start: DateTime<Utc>,
    existing: &[&str],
) -> String {
    let taken: HashSet<&str> = existing.iter().copied().collect();

    let mut base = sanitize_slug(title);
    if base.is_empty() {
        base = FALLBACK_SLUG.to_string();
    }
    if !taken.contains(base.as_str()) {
        return base;
    }

    let venue_part = venue.map(sanitize_slug).filter(|v| !v.is_empty());
    let date_part = start.format("%Y-%m-%d").to_string();

    let mut candidates = Vec::with_capacity(3);
    if let Some(v) = &venue_part {
        candidates.push(format!("{base}-{v}"));
    }
    candidates.push(format!("{base}-{date_part}"));
    if let Some(v) = &venue_part {
        candidates.push(format!("{base}-{v}-{date_part}"));
    }

    for candidate in &candidates {
        if !taken.contains(candidate.as_str()) {
            return candidate.clone();
        }
    }

    // Every contextual suffix is taken; count upward from the most specific one
    let stem = candidates.last().cloned().unwrap_or(base);
    let mut counter = 2u32;
    loop {
        let candidate = format!("{stem}-{counter}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Fresh random event identifier (UUID v4)
pub fn new_event_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
