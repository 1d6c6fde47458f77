// src/models/viewport.rs
// DOCUMENTATION: Visible map region
// PURPOSE: Center coordinate plus angular span, as reported by the mapping layer

use serde::{Deserialize, Serialize};

/// Span used when focusing a single place (search result selection)
pub const FOCUS_DELTA_DEGREES: f64 = 0.01;

/// A plain coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// "lat,lng" form used by the provider's location parameter
    pub fn to_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Currently visible map region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Viewport {
    /// Region centered on a point with the focus span
    pub fn focused_on(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta: FOCUS_DELTA_DEGREES,
            longitude_delta: FOCUS_DELTA_DEGREES,
        }
    }

    /// Whether zoom and radius can be derived from this region
    /// DOCUMENTATION: Zero, negative or non-finite deltas would divide by zero
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude_delta.is_finite()
            && self.longitude_delta.is_finite()
            && self.latitude_delta > 0.0
            && self.longitude_delta > 0.0
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}
