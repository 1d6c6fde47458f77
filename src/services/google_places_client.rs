// src/services/google_places_client.rs
// DOCUMENTATION: Google Places API client
// PURPOSE: Live text/nearby search and rating/photo lookups against the provider

use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::{ExternalDetails, ExternalPlace, LatLng};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;

/// Provider's maximum nearby search radius in meters
pub const MAX_NEARBY_RADIUS_M: f64 = 10_000.0;

/// Text search results kept per query
pub const TEXT_SEARCH_RESULT_CAP: usize = 10;

/// Default width for photo URLs
pub const DEFAULT_PHOTO_WIDTH: u32 = 400;

/// How a call behaves when the local quota is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuotaPolicy {
    /// Viewport and text searches: skip the call, the next cycle retries
    FailFast,
    /// Enrichment lookups: queue until a cell frees up
    Wait,
}

/// Third-party place search
/// DOCUMENTATION: Implementations report failures; the viewport controller
/// fails soft (logs, withholds provider results, shows an advisory)
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Free-text search, capped to TEXT_SEARCH_RESULT_CAP, fixed locale
    async fn search_by_text(&self, query: &str) -> Result<Vec<ExternalPlace>, PlacesError>;

    /// Places around a center; the radius is clamped to MAX_NEARBY_RADIUS_M
    async fn search_nearby(
        &self,
        center: LatLng,
        radius_meters: f64,
        category_filter: &str,
    ) -> Result<Vec<ExternalPlace>, PlacesError>;

    /// Rating and photo URLs for one provider place
    async fn place_details(&self, provider_id: &str) -> Result<ExternalDetails, PlacesError>;
}

/// Google Places API client
/// DOCUMENTATION: Handles authentication, quota guard and API calls to Google Places
pub struct GooglePlacesClient {
    /// HTTP client for making requests
    client: Client,
    /// Google Places API key
    api_key: String,
    /// Base URL for Google Places API
    base_url: String,
    /// Pinned locale for text search
    language: String,
    region: String,
    /// Width requested for photo URLs
    photo_max_width: u32,
    /// Local quota guard, None = unlimited
    limiter: Option<DefaultDirectRateLimiter>,
}

/// Individual place from Google Places API
/// DOCUMENTATION: Subset of the fields returned by search and details endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GooglePlace {
    /// Google's unique place identifier
    pub place_id: String,
    /// Place name
    pub name: String,
    /// Place types array (e.g., ["museum", "point_of_interest"])
    #[serde(default)]
    pub types: Vec<String>,
    /// Geographic location
    pub geometry: GoogleGeometry,
    /// Formatted address (text search, details)
    pub formatted_address: Option<String>,
    /// Vicinity (short address, from Nearby Search)
    pub vicinity: Option<String>,
    /// Rating (0-5)
    pub rating: Option<f32>,
    /// Opening hours indicator
    pub opening_hours: Option<GoogleOpeningHours>,
    /// Photos
    pub photos: Option<Vec<GooglePhoto>>,
}

/// Geographic location from Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleGeometry {
    pub location: GoogleLocation,
}

/// Coordinates from Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Opening hours metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleOpeningHours {
    pub open_now: Option<bool>,
}

/// Photo from Google Places
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GooglePhoto {
    /// Photo reference (used to fetch actual photo)
    pub photo_reference: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// Rating/photos subset of a Place Details result
#[derive(Debug, Default, Deserialize)]
struct GoogleDetails {
    rating: Option<f64>,
    #[serde(default)]
    photos: Vec<GooglePhoto>,
}

impl GooglePlace {
    /// Convert to the transient map model
    /// DOCUMENTATION: None when the coordinate is not usable
    pub fn to_external_place(&self) -> Option<ExternalPlace> {
        let location = &self.geometry.location;
        if !LatLng::new(location.lat, location.lng).is_valid() {
            return None;
        }

        Some(ExternalPlace {
            provider_id: self.place_id.clone(),
            name: self.name.clone(),
            latitude: location.lat,
            longitude: location.lng,
            rating: self.rating,
            photo_references: self
                .photos
                .as_ref()
                .map(|photos| photos.iter().map(|p| p.photo_reference.clone()).collect())
                .unwrap_or_default(),
            // Prefer formatted_address over vicinity (more detailed)
            formatted_address: self
                .formatted_address
                .clone()
                .or_else(|| self.vicinity.clone()),
            types: self.types.clone(),
            open_now: self.opening_hours.as_ref().and_then(|h| h.open_now),
        })
    }
}

impl GooglePlacesClient {
    /// Create new Google Places API client
    /// DOCUMENTATION: Initializes client with API key, default locale and no quota guard
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            language: "en".to_string(),
            region: "us".to_string(),
            photo_max_width: DEFAULT_PHOTO_WIDTH,
            limiter: None,
        }
    }

    /// Create client from application configuration
    /// DOCUMENTATION: Applies timeout, base URL, locale, photo width and quota guard
    pub fn from_config(config: &Config) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PlacesError::InvalidInput(format!("HTTP client setup failed: {}", e)))?;

        let per_second =
            NonZeroU32::new(config.provider_requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            client,
            api_key: config.google_places_api_key.clone(),
            base_url: config.google_places_base_url.trim_end_matches('/').to_string(),
            language: config.search_language.clone(),
            region: config.search_region.clone(),
            photo_max_width: config.photo_max_width,
            limiter: Some(RateLimiter::direct(Quota::per_second(per_second))),
        })
    }

    /// Get photo URL from photo reference
    /// DOCUMENTATION: Photos are addressed by URL construction, not a JSON call
    pub fn get_photo_url(&self, photo_reference: &str, max_width: Option<u32>) -> String {
        let width = max_width.unwrap_or(self.photo_max_width);
        format!(
            "{}/photo?maxwidth={}&photoreference={}&key={}",
            self.base_url, width, photo_reference, self.api_key
        )
    }

    /// Take one cell from the local quota, if a guard is configured
    async fn acquire_quota(&self, endpoint: &str, policy: QuotaPolicy) -> Result<(), PlacesError> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        match policy {
            QuotaPolicy::Wait => {
                limiter.until_ready().await;
                Ok(())
            }
            QuotaPolicy::FailFast => {
                if limiter.check().is_err() {
                    log::warn!("Local Google Places quota exhausted, skipping {}", endpoint);
                    return Err(PlacesError::RateLimitExceeded);
                }
                Ok(())
            }
        }
    }

    /// Issue a GET against an endpoint and return the status-checked JSON body
    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        policy: QuotaPolicy,
    ) -> Result<Value, PlacesError> {
        if self.api_key.is_empty() {
            return Err(PlacesError::ExternalApiError(
                "Google Places API key not configured".to_string(),
            ));
        }

        self.acquire_quota(endpoint, policy).await?;

        let url = format!("{}/{}/json", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("Google Places API request failed: {}", e);
                PlacesError::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Google Places API error {}: {}", status, body);
            return Err(PlacesError::ExternalApiError(format!(
                "API error {}: {}",
                status, body
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            log::error!("Failed to parse Google Places response: {}", e);
            PlacesError::MalformedResponse(format!("Parse error: {}", e))
        })
    }
}

#[async_trait]
impl PlaceProvider for GooglePlacesClient {
    async fn search_by_text(&self, query: &str) -> Result<Vec<ExternalPlace>, PlacesError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!("Google Places text search: query={}", query);

        let params = [
            ("query", query.to_string()),
            ("language", self.language.clone()),
            ("region", self.region.clone()),
        ];
        let body = self.get_json("textsearch", &params, QuotaPolicy::FailFast).await?;

        let mut places = decode_search_body(body)?;
        places.truncate(TEXT_SEARCH_RESULT_CAP);
        log::info!("Google Places text search returned {} results", places.len());
        Ok(places)
    }

    async fn search_nearby(
        &self,
        center: LatLng,
        radius_meters: f64,
        category_filter: &str,
    ) -> Result<Vec<ExternalPlace>, PlacesError> {
        let radius = clamp_radius(radius_meters);

        log::debug!(
            "Google Places nearby search: lat={}, lng={}, radius={}",
            center.latitude,
            center.longitude,
            radius
        );

        let mut params = vec![
            ("location", center.to_param()),
            ("radius", radius.to_string()),
        ];
        if !category_filter.is_empty() {
            params.push(("type", category_filter.to_string()));
        }

        let body = self.get_json("nearbysearch", &params, QuotaPolicy::FailFast).await?;
        let places = decode_search_body(body)?;
        log::info!("Google Places nearby search returned {} results", places.len());
        Ok(places)
    }

    async fn place_details(&self, provider_id: &str) -> Result<ExternalDetails, PlacesError> {
        log::debug!("Google Places details lookup: place_id={}", provider_id);

        let params = [
            ("place_id", provider_id.to_string()),
            ("fields", "rating,photos".to_string()),
        ];
        // A batch of details lookups queues on the quota rather than losing ratings
        let mut body = self.get_json("details", &params, QuotaPolicy::Wait).await?;
        check_status(&body)?;

        let details: GoogleDetails = match body.get_mut("result").map(Value::take) {
            Some(result) => serde_json::from_value(result)
                .map_err(|e| PlacesError::MalformedResponse(format!("Details parse error: {}", e)))?,
            None => GoogleDetails::default(),
        };

        Ok(ExternalDetails {
            rating: details.rating.filter(|r| r.is_finite()).unwrap_or(0.0),
            photos: details
                .photos
                .iter()
                .map(|photo| self.get_photo_url(&photo.photo_reference, None))
                .collect(),
        })
    }
}

/// Clamp to the provider maximum, rounded to whole meters
fn clamp_radius(radius_meters: f64) -> u32 {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return 1;
    }
    radius_meters.min(MAX_NEARBY_RADIUS_M).round().max(1.0) as u32
}

/// Check the API response status
/// DOCUMENTATION: OK and ZERO_RESULTS succeed; quota errors map to RateLimitExceeded
fn check_status(body: &Value) -> Result<(), PlacesError> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("OK");
    let error_message = body
        .get("error_message")
        .and_then(Value::as_str)
        .map(str::to_string);

    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" => {
            log::error!("Google Places API quota exceeded");
            Err(PlacesError::RateLimitExceeded)
        }
        "REQUEST_DENIED" | "INVALID_REQUEST" => {
            let msg = error_message.unwrap_or_else(|| "Unknown error".to_string());
            log::error!("Google Places API request denied: {}", msg);
            Err(PlacesError::ExternalApiError(msg))
        }
        other => {
            let msg = error_message.unwrap_or_else(|| format!("Unknown status: {}", other));
            log::error!("Google Places API unexpected status: {}", msg);
            Err(PlacesError::ExternalApiError(msg))
        }
    }
}

/// Decode a `{ results, status }` body record by record
/// DOCUMENTATION: Malformed results are dropped, not the batch
fn decode_search_body(mut body: Value) -> Result<Vec<ExternalPlace>, PlacesError> {
    check_status(&body)?;

    let records = match body.get_mut("results").map(Value::take) {
        Some(Value::Array(records)) => records,
        Some(Value::Null) | None => return Ok(Vec::new()),
        Some(_) => {
            return Err(PlacesError::MalformedResponse(
                "results is not an array".to_string(),
            ))
        }
    };

    let total = records.len();
    let places: Vec<ExternalPlace> = records
        .into_iter()
        .filter_map(|record| {
            match serde_json::from_value::<GooglePlace>(record) {
                Ok(place) => place.to_external_place(),
                Err(e) => {
                    log::warn!("Dropping malformed Google place: {}", e);
                    None
                }
            }
        })
        .collect();

    if places.len() < total {
        log::warn!("Dropped {} of {} Google places", total - places.len(), total);
    }

    Ok(places)
}
