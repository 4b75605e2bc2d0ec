//! Media reference checks
//!
//! Answers whether any stored event still points at a media URL. Every
//! event counts, whatever its status or date. There is no reverse index, so
//! each check scans all weeks.

use crate::storage::backend::EventBackend;
use crate::storage::error::StorageResult;
use crate::storage::week::WeekKey;

/// An event that points at a given asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub week: WeekKey,
    pub event_id: String,
    pub slug: String,
}

/// True if any event's hero or gallery image is `url`
pub fn is_asset_referenced(backend: &dyn EventBackend, url: &str) -> StorageResult<bool> {
    for week in backend.scan_weeks()? {
        let week = week?;
        if week
            .events
            .iter()
            .any(|event| event.image_urls().any(|u| u == url))
        {
            tracing::debug!(url, week = %week.week_start_date, "Asset is referenced");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Every event referencing `url`
pub fn asset_references(
    backend: &dyn EventBackend,
    url: &str,
) -> StorageResult<Vec<AssetReference>> {
    let mut refs = Vec::new();
    for week in backend.scan_weeks()? {
        let week = week?;
        for event in &week.events {
            if event.image_urls().any(|u| u == url) {
                refs.push(AssetReference {
                    week: week.week_start_date,
                    event_id: event.id.clone(),
                    slug: event.slug.clone(),
                });
            }
        }
    }
    Ok(refs)
}
