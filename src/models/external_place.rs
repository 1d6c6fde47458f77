// src/models/external_place.rs
// DOCUMENTATION: Places supplied live by the third-party provider
// PURPOSE: Transient records, re-fetched on every viewport change and never persisted

use geo_types::Point;
use serde::{Deserialize, Serialize};

/// A provider search result in the shape the map layer consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalPlace {
    /// Provider's unique place identifier
    pub provider_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Provider rating (0-5), when the provider has one
    pub rating: Option<f32>,
    /// Photo references, resolved to URLs by the provider client
    pub photo_references: Vec<String>,
    pub formatted_address: Option<String>,
    /// Category tags (e.g., ["museum", "point_of_interest"])
    pub types: Vec<String>,
    pub open_now: Option<bool>,
}

impl ExternalPlace {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Rating with absence resolved to zero
    pub fn rating_or_zero(&self) -> f32 {
        self.rating.filter(|r| r.is_finite()).unwrap_or(0.0)
    }
}

/// Rating and photos fetched for a single provider place
/// DOCUMENTATION: Defaults to rating 0 and no photos
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalDetails {
    pub rating: f64,
    pub photos: Vec<String>,
}

#[cfg(test)]
pub(crate) fn sample_external(provider_id: &str, name: &str, lat: f64, lng: f64) -> ExternalPlace {
    ExternalPlace {
        provider_id: provider_id.to_string(),
        name: name.to_string(),
        latitude: lat,
        longitude: lng,
        rating: None,
        photo_references: Vec::new(),
        formatted_address: None,
        types: Vec::new(),
        open_now: None,
    }
}
