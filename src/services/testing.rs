// src/services/testing.rs
// In-memory CatalogApi / PlaceProvider fakes for unit tests

use crate::errors::PlacesError;
use crate::models::{
    CatalogFilter, CatalogSearch, ExternalDetails, ExternalPlace, LatLng, Place, RatingSubmission,
};
use crate::services::{CatalogApi, PlaceProvider};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct CatalogState {
    by_filter: HashMap<CatalogFilter, Vec<Place>>,
    nearby: Vec<Place>,
    text: Vec<Place>,
    ratings: HashMap<String, f64>,
    failing_ratings: HashSet<String>,
    fail_lists: bool,
    list_calls: usize,
    submissions: Vec<(String, String, u8)>,
    latency: Duration,
}

#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<CatalogState>,
}

impl FakeCatalog {
    pub fn set_places(&self, filter: CatalogFilter, places: Vec<Place>) {
        self.state.lock().unwrap().by_filter.insert(filter, places);
    }

    pub fn set_nearby(&self, places: Vec<Place>) {
        self.state.lock().unwrap().nearby = places;
    }

    pub fn set_text_results(&self, places: Vec<Place>) {
        self.state.lock().unwrap().text = places;
    }

    pub fn set_rating(&self, place_id: &str, rating: f64) {
        self.state
            .lock()
            .unwrap()
            .ratings
            .insert(place_id.to_string(), rating);
    }

    pub fn fail_rating_for(&self, place_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_ratings
            .insert(place_id.to_string());
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().unwrap().fail_lists = fail;
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().unwrap().latency = latency;
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn submissions(&self) -> Vec<(String, String, u8)> {
        self.state.lock().unwrap().submissions.clone()
    }

    async fn pause(&self) {
        let latency = self.state.lock().unwrap().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn list(&self, pick: impl FnOnce(&CatalogState) -> Vec<Place>) -> Result<Vec<Place>, PlacesError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.fail_lists {
            return Err(PlacesError::NetworkFailure("backend unreachable".to_string()));
        }
        Ok(pick(&state))
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn fetch_by_filter(&self, filter: CatalogFilter) -> Result<Vec<Place>, PlacesError> {
        self.pause().await;
        self.list(|s| s.by_filter.get(&filter).cloned().unwrap_or_default())
    }

    async fn fetch_nearby(&self, _center: LatLng, _radius: u32) -> Result<Vec<Place>, PlacesError> {
        self.pause().await;
        self.list(|s| s.nearby.clone())
    }

    async fn fetch_by_text_query(&self, search: &CatalogSearch) -> Result<Vec<Place>, PlacesError> {
        if search.query.is_empty() {
            return Ok(Vec::new());
        }
        self.pause().await;
        self.list(|s| s.text.clone())
    }

    async fn fetch_average_rating(&self, place_id: &str) -> Result<f64, PlacesError> {
        self.pause().await;
        let state = self.state.lock().unwrap();
        if state.failing_ratings.contains(place_id) {
            return Err(PlacesError::NetworkFailure("timeout".to_string()));
        }
        Ok(state.ratings.get(place_id).copied().unwrap_or(0.0))
    }

    async fn submit_rating(
        &self,
        place_id: &str,
        user_id: &str,
        submission: &RatingSubmission,
    ) -> Result<(), PlacesError> {
        let mut state = self.state.lock().unwrap();
        state
            .submissions
            .push((place_id.to_string(), user_id.to_string(), submission.value));
        state.ratings.insert(place_id.to_string(), submission.value as f64);
        Ok(())
    }
}

#[derive(Default)]
struct ProviderState {
    nearby: Vec<ExternalPlace>,
    text: Vec<ExternalPlace>,
    details: HashMap<String, ExternalDetails>,
    failing_details: HashSet<String>,
    nearby_error: Option<PlacesError>,
    nearby_calls: Vec<(LatLng, f64)>,
    text_calls: Vec<String>,
    details_calls: usize,
    latency: Duration,
    /// Per-query latency override, to stage out-of-order responses
    text_latency: HashMap<String, Duration>,
}

#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<ProviderState>,
}

impl FakeProvider {
    pub fn set_nearby(&self, places: Vec<ExternalPlace>) {
        self.state.lock().unwrap().nearby = places;
    }

    pub fn set_text_results(&self, places: Vec<ExternalPlace>) {
        self.state.lock().unwrap().text = places;
    }

    pub fn set_details(&self, provider_id: &str, details: ExternalDetails) {
        self.state
            .lock()
            .unwrap()
            .details
            .insert(provider_id.to_string(), details);
    }

    pub fn fail_details_for(&self, provider_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_details
            .insert(provider_id.to_string());
    }

    pub fn fail_nearby_with(&self, error: Option<PlacesError>) {
        self.state.lock().unwrap().nearby_error = error;
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().unwrap().latency = latency;
    }

    pub fn set_text_latency(&self, query: &str, latency: Duration) {
        self.state
            .lock()
            .unwrap()
            .text_latency
            .insert(query.to_string(), latency);
    }

    pub fn nearby_calls(&self) -> Vec<(LatLng, f64)> {
        self.state.lock().unwrap().nearby_calls.clone()
    }

    pub fn text_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().text_calls.clone()
    }

    pub fn details_calls(&self) -> usize {
        self.state.lock().unwrap().details_calls
    }
}

#[async_trait]
impl PlaceProvider for FakeProvider {
    async fn search_by_text(&self, query: &str) -> Result<Vec<ExternalPlace>, PlacesError> {
        let latency = {
            let mut state = self.state.lock().unwrap();
            state.text_calls.push(query.to_string());
            state.text_latency.get(query).copied().unwrap_or(state.latency)
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.lock().unwrap();
        Ok(state
            .text
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query.to_lowercase()))
            .cloned()
            .collect())
    }

    async fn search_nearby(
        &self,
        center: LatLng,
        radius_meters: f64,
        _category_filter: &str,
    ) -> Result<Vec<ExternalPlace>, PlacesError> {
        let latency = {
            let mut state = self.state.lock().unwrap();
            state.nearby_calls.push((center, radius_meters));
            state.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.lock().unwrap();
        match &state.nearby_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.nearby.clone()),
        }
    }

    async fn place_details(&self, provider_id: &str) -> Result<ExternalDetails, PlacesError> {
        let latency = {
            let mut state = self.state.lock().unwrap();
            state.details_calls += 1;
            state.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.lock().unwrap();
        if state.failing_details.contains(provider_id) {
            return Err(PlacesError::RateLimitExceeded);
        }
        Ok(state.details.get(provider_id).cloned().unwrap_or_default())
    }
}
