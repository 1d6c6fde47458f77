// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod catalog_client;
pub mod debounce;
pub mod deduplicator;
pub mod geo_math;
pub mod google_places_client;
pub mod rating_aggregator;
pub mod selection;
pub mod session_registry;
pub mod viewport_controller;

#[cfg(test)]
pub mod testing;

pub use catalog_client::*;
pub use debounce::*;
pub use deduplicator::*;
pub use geo_math::*;
pub use google_places_client::*;
pub use rating_aggregator::*;
pub use selection::*;
pub use session_registry::*;
pub use viewport_controller::*;
