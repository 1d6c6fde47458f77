// src/services/geo_math.rs
// DOCUMENTATION: Viewport geometry
// PURPOSE: Convert a map viewport into a zoom level and an approximate search radius

use crate::errors::PlacesError;
use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Earth's mean radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Web-mercator tile size in pixels
const TILE_SIZE_PX: f64 = 256.0;

/// Platform flavour of a directions deep link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

/// Pure viewport geometry helpers
/// DOCUMENTATION: Total functions. Callers guard against zero or non-finite deltas
/// (see Viewport::is_valid) before invoking them.
pub struct GeoMath;

impl GeoMath {
    /// Continuous zoom level, higher = more zoomed in
    /// DOCUMENTATION: log2(360 * (width / 256 / longitudeDelta)) + 1
    ///
    /// # Arguments
    /// * `viewport_width_px` - Width of the map view in pixels
    /// * `longitude_delta` - Horizontal angular span in degrees
    pub fn zoom_level(viewport_width_px: f64, longitude_delta: f64) -> f64 {
        (360.0 * (viewport_width_px / TILE_SIZE_PX / longitude_delta)).log2() + 1.0
    }

    /// Approximate radius of the visible region in meters
    /// DOCUMENTATION: Latitude delta in radians times Earth's radius, halved
    pub fn search_radius_meters(latitude_delta: f64) -> f64 {
        latitude_delta.to_radians() * EARTH_RADIUS_M / 2.0
    }

    /// Walking-directions deep link for a coordinate
    /// DOCUMENTATION: Point x = longitude, y = latitude
    pub fn directions_url(
        coordinate: Option<Point<f64>>,
        platform: Platform,
    ) -> Result<String, PlacesError> {
        let point = coordinate
            .filter(|p| p.x().is_finite() && p.y().is_finite())
            .ok_or_else(|| {
                PlacesError::InvalidInput("Invalid coordinates for directions".to_string())
            })?;

        let (lat, lng) = (point.y(), point.x());
        Ok(match platform {
            Platform::Ios => format!("maps://?daddr={},{}&directionsmode=walking", lat, lng),
            Platform::Android => format!("google.navigation:q={},{}&mode=w", lat, lng),
        })
    }
}
