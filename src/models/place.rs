// src/models/place.rs
// DOCUMENTATION: Internal catalog place records
// PURPOSE: Serialization model for places curated by the backend, plus coordinate parsing

use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents a curated place as returned by the catalog backend
/// DOCUMENTATION: The client holds an immutable-per-fetch snapshot of these.
/// The last three fields are derived after fetch by the rating aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Catalog identifier
    pub id: String,

    /// Provider place identifier, when the place is known to the provider
    #[serde(default, rename = "placeId")]
    pub external_id: Option<String>,

    /// Display title (the search endpoint sends it as `name`)
    #[serde(alias = "name")]
    pub title: String,

    /// Free-text location label
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    /// Serialized "lat,lng" coordinate
    #[serde(default)]
    pub coordinates: Option<String>,

    /// Typed coordinate, used when the serialized form is absent
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub fun_fact: Option<String>,

    /// Story style tag (narrative, historical, ...)
    #[serde(default)]
    pub style: Option<String>,

    #[serde(default)]
    pub likes: u32,

    #[serde(default)]
    pub comments: u32,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Full story generated (true) or preview only (false)
    #[serde(default)]
    pub is_enhanced: bool,

    /// Internal 1-5 average user rating, 0 when unknown
    #[serde(default)]
    pub average_rating: f64,

    /// Provider rating, 0 when unknown
    #[serde(default, rename = "googleRating")]
    pub external_rating: f64,

    /// Provider photo URLs
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Catalog listing filters
/// DOCUMENTATION: Maps onto GET /places?filter=...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFilter {
    Popular,
    Recent,
    Historical,
}

impl CatalogFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogFilter::Popular => "popular",
            CatalogFilter::Recent => "recent",
            CatalogFilter::Historical => "historical",
        }
    }
}

impl Place {
    /// Resolve the marker coordinate
    /// DOCUMENTATION: The serialized "lat,lng" form wins over the typed pair.
    /// Anything that does not parse to two finite, in-range numbers is absent.
    /// Point x = longitude, y = latitude.
    pub fn coordinate(&self) -> Option<Point<f64>> {
        if let Some(raw) = self.coordinates.as_deref() {
            if !raw.trim().is_empty() {
                return parse_lat_lng(raw);
            }
        }

        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => valid_point(lat, lng),
            _ => None,
        }
    }

    /// Provider identifier, ignoring blank values
    pub fn external_id(&self) -> Option<&str> {
        self.external_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Parse a "lat,lng" string into a point
pub fn parse_lat_lng(raw: &str) -> Option<Point<f64>> {
    let mut parts = raw.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lng = parts.next()?.trim().parse::<f64>().ok()?;

    if parts.next().is_some() {
        return None;
    }

    valid_point(lat, lng)
}

fn valid_point(lat: f64, lng: f64) -> Option<Point<f64>> {
    if !lat.is_finite() || !lng.is_finite() {
        return None;
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some(Point::new(lng, lat))
}

/// Decode a list of places record by record
/// DOCUMENTATION: A malformed record is logged and dropped; the rest of the batch survives
pub fn decode_places(records: Vec<Value>) -> Vec<Place> {
    let total = records.len();
    let places: Vec<Place> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Place>(record) {
            Ok(place) => Some(place),
            Err(e) => {
                log::warn!("Dropping malformed place record: {}", e);
                None
            }
        })
        .collect();

    if places.len() < total {
        log::warn!("Dropped {} of {} place records", total - places.len(), total);
    }

    places
}

#[cfg(test)]
pub(crate) fn sample_place(id: &str, title: &str, coordinates: Option<&str>) -> Place {
    Place {
        id: id.to_string(),
        external_id: None,
        title: title.to_string(),
        location: None,
        city: None,
        country: None,
        coordinates: coordinates.map(str::to_string),
        latitude: None,
        longitude: None,
        description: None,
        fun_fact: None,
        style: None,
        likes: 0,
        comments: 0,
        created_at: None,
        is_enhanced: false,
        average_rating: 0.0,
        external_rating: 0.0,
        photos: Vec::new(),
    }
}
