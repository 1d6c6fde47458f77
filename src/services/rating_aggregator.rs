// src/services/rating_aggregator.rs
// DOCUMENTATION: Multi-source rating enrichment
// PURPOSE: Attach internal average rating and provider rating/photos to a batch of places

use crate::models::{ExternalDetails, Place, Rating};
use crate::services::{CatalogApi, PlaceProvider};
use futures::future::join_all;
use std::sync::Arc;

/// Enriches places with ratings from both sources
/// DOCUMENTATION: Fan-out/fan-in. Every place issues its two lookups concurrently,
/// all places run concurrently, and the batch is returned only when every lookup
/// has settled. A failed lookup defaults its field and never fails the batch.
pub struct RatingAggregator {
    catalog: Arc<dyn CatalogApi>,
    provider: Arc<dyn PlaceProvider>,
}

impl RatingAggregator {
    pub fn new(catalog: Arc<dyn CatalogApi>, provider: Arc<dyn PlaceProvider>) -> Self {
        Self { catalog, provider }
    }

    /// Enrich a batch, preserving order
    pub async fn enrich(&self, places: Vec<Place>) -> Vec<Place> {
        if places.is_empty() {
            return places;
        }

        let count = places.len();
        let enriched = join_all(places.into_iter().map(|place| self.enrich_one(place))).await;
        log::debug!("Enriched ratings for {} places", count);
        enriched
    }

    async fn enrich_one(&self, mut place: Place) -> Place {
        let (average, details) = tokio::join!(
            self.fetch_average(&place.id),
            self.fetch_details(place.external_id())
        );

        let rating = Rating {
            place_id: place.id.clone(),
            average,
            external: details.rating,
        };

        place.average_rating = rating.average;
        place.external_rating = rating.external;
        place.photos = details.photos;
        place
    }

    async fn fetch_average(&self, place_id: &str) -> f64 {
        match self.catalog.fetch_average_rating(place_id).await {
            Ok(average) if average.is_finite() => average,
            Ok(_) => 0.0,
            Err(e) => {
                log::warn!("Average rating unavailable for {}: {}", place_id, e);
                0.0
            }
        }
    }

    async fn fetch_details(&self, provider_id: Option<&str>) -> ExternalDetails {
        let Some(provider_id) = provider_id else {
            return ExternalDetails::default();
        };

        match self.provider.place_details(provider_id).await {
            Ok(details) => details,
            Err(e) => {
                log::warn!("Provider rating unavailable for {}: {}", provider_id, e);
                ExternalDetails::default()
            }
        }
    }
}
