// src/services/catalog_client.rs
// DOCUMENTATION: Internal catalog backend client
// PURPOSE: Fetch curated places, user ratings, and submit ratings

use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::{
    coerce_rating, decode_places, sort_places, CatalogFilter, CatalogSearch, LatLng, Place,
    RatingSubmission,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::time::Duration;
use validator::Validate;

/// Header carrying the caller identity on rating submissions
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Read/write operations against the catalog backend
/// DOCUMENTATION: Each call is one request/response round trip, no retries.
/// Callers turn errors into empty or last-known-good results.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// GET /places?filter=popular|recent|historical
    async fn fetch_by_filter(&self, filter: CatalogFilter) -> Result<Vec<Place>, PlacesError>;

    /// POST /places/nearby {latitude, longitude, radius}
    async fn fetch_nearby(&self, center: LatLng, radius_meters: u32)
        -> Result<Vec<Place>, PlacesError>;

    /// GET /search?query=..&rating=..; an empty query returns no places without a request
    async fn fetch_by_text_query(&self, search: &CatalogSearch) -> Result<Vec<Place>, PlacesError>;

    /// GET /ratings?placeId=<id> -> averageRating (0 when absent)
    async fn fetch_average_rating(&self, place_id: &str) -> Result<f64, PlacesError>;

    /// POST /ratings?placeId=<id> {value}; last write wins per (user, place)
    async fn submit_rating(
        &self,
        place_id: &str,
        user_id: &str,
        submission: &RatingSubmission,
    ) -> Result<(), PlacesError>;
}

/// HTTP implementation of CatalogApi
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Create new catalog client
    /// DOCUMENTATION: `base_url` is the backend API root, without trailing slash
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlacesError::InvalidInput(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, PlacesError> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a `{ places: [...] }` response body
    async fn read_places(response: Response) -> Result<Vec<Place>, PlacesError> {
        let body: Value = ensure_success(response).await?.json().await?;
        Ok(places_from_body(body))
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn fetch_by_filter(&self, filter: CatalogFilter) -> Result<Vec<Place>, PlacesError> {
        log::debug!("Catalog fetch: filter={}", filter.as_str());

        let response = self
            .client
            .get(self.url("/places"))
            .query(&[("filter", filter.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("Catalog request failed: {}", e);
                PlacesError::from(e)
            })?;

        let places = Self::read_places(response).await?;
        log::info!("Catalog returned {} {} places", places.len(), filter.as_str());
        Ok(places)
    }

    async fn fetch_nearby(
        &self,
        center: LatLng,
        radius_meters: u32,
    ) -> Result<Vec<Place>, PlacesError> {
        log::debug!(
            "Catalog nearby: lat={}, lng={}, radius={}",
            center.latitude,
            center.longitude,
            radius_meters
        );

        let response = self
            .client
            .post(self.url("/places/nearby"))
            .json(&json!({
                "latitude": center.latitude,
                "longitude": center.longitude,
                "radius": radius_meters,
            }))
            .send()
            .await
            .map_err(|e| {
                log::error!("Catalog nearby request failed: {}", e);
                PlacesError::from(e)
            })?;

        Self::read_places(response).await
    }

    async fn fetch_by_text_query(&self, search: &CatalogSearch) -> Result<Vec<Place>, PlacesError> {
        if search.query.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = vec![
            ("query", search.query.trimmed().to_string()),
            ("sortBy", search.sort_by.as_str().to_string()),
            ("order", search.order.as_str().to_string()),
        ];
        if let Some(min) = search.query.min_rating {
            params.push(("rating", min.to_string()));
        }

        let response = self
            .client
            .get(self.url("/search"))
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                log::error!("Catalog search failed: {}", e);
                PlacesError::from(e)
            })?;

        let mut places = Self::read_places(response).await?;
        sort_places(&mut places, search.query.trimmed(), search.sort_by, search.order);
        Ok(places)
    }

    async fn fetch_average_rating(&self, place_id: &str) -> Result<f64, PlacesError> {
        let response = self
            .client
            .get(self.url("/ratings"))
            .query(&[("placeId", place_id)])
            .send()
            .await?;

        let body: Value = ensure_success(response).await?.json().await?;
        Ok(coerce_rating(body.get("averageRating")))
    }

    async fn submit_rating(
        &self,
        place_id: &str,
        user_id: &str,
        submission: &RatingSubmission,
    ) -> Result<(), PlacesError> {
        submission.validate()?;
        if user_id.trim().is_empty() {
            return Err(PlacesError::Unauthorized);
        }

        let response = self
            .client
            .post(self.url("/ratings"))
            .query(&[("placeId", place_id)])
            .header(USER_ID_HEADER, user_id)
            .json(submission)
            .send()
            .await?;

        ensure_success(response).await?;
        log::info!("Rating {} submitted for place {}", submission.value, place_id);
        Ok(())
    }
}

/// Map a non-2xx response to BackendError, keeping the backend's message if any
async fn ensure_success(response: Response) -> Result<Response, PlacesError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::error!("Catalog backend error {}: {}", status, body);
    Err(backend_error(status.as_u16(), &body))
}

fn backend_error(status: u16, body: &str) -> PlacesError {
    if status == 401 || status == 403 {
        return PlacesError::Unauthorized;
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();

    PlacesError::BackendError { status, message }
}

/// A missing or non-array `places` field is an empty list
fn places_from_body(body: Value) -> Vec<Place> {
    match body {
        Value::Object(mut map) => match map.remove("places") {
            Some(Value::Array(records)) => decode_places(records),
            _ => {
                log::warn!("Catalog response has no places array");
                Vec::new()
            }
        },
        _ => {
            log::warn!("Catalog response is not an object");
            Vec::new()
        }
    }
}
