// src/services/deduplicator.rs
// DOCUMENTATION: Cross-source record deduplication
// PURPOSE: Suppress provider results that represent a place already in the internal catalog

use crate::models::{ExternalPlace, Place};

/// Per-component coordinate tolerance (~111 m at the equator)
pub const DUPLICATE_DEGREES: f64 = 0.001;

/// Merges provider results against the internal set
/// DOCUMENTATION: Heuristic, not exact identity. Same place spelled differently is
/// shown twice; two distinct same-named places closer than the tolerance are merged.
pub struct Deduplicator;

impl Deduplicator {
    /// Externals that survive, in their original order
    pub fn merge(internal: &[Place], external: &[ExternalPlace]) -> Vec<ExternalPlace> {
        let survivors: Vec<ExternalPlace> = external
            .iter()
            .filter(|candidate| !internal.iter().any(|place| Self::is_duplicate(place, candidate)))
            .cloned()
            .collect();

        if survivors.len() < external.len() {
            log::debug!(
                "Deduplicator suppressed {} of {} provider places",
                external.len() - survivors.len(),
                external.len()
            );
        }

        survivors
    }

    /// Whether an external place is the same physical place as an internal one
    /// DOCUMENTATION: Exact provider id match, or case-insensitive name match with
    /// both coordinate components within DUPLICATE_DEGREES
    pub fn is_duplicate(place: &Place, candidate: &ExternalPlace) -> bool {
        if place.external_id() == Some(candidate.provider_id.as_str()) {
            return true;
        }

        if place.title.to_lowercase() != candidate.name.to_lowercase() {
            return false;
        }

        match place.coordinate() {
            Some(point) => {
                (point.y() - candidate.latitude).abs() < DUPLICATE_DEGREES
                    && (point.x() - candidate.longitude).abs() < DUPLICATE_DEGREES
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::external_place::sample_external;
    use crate::models::place::sample_place;

    #[test]
    fn test_red_square_suppressed_by_name_and_proximity() {
        let internal = vec![sample_place("p1", "Red Square", Some("55.7539,37.6208"))];
        let external = vec![sample_external("g1", "Red Square", 55.7540, 37.6209)];

        assert!(Deduplicator::merge(&internal, &external).is_empty());
    }

    #[test]
    fn test_suppressed_by_provider_id() {
        let mut place = sample_place("p1", "Completely different title", None);
        place.external_id = Some("g1".to_string());
        let external = vec![
            sample_external("g1", "Red Square", 10.0, 10.0),
            sample_external("g2", "GUM", 55.7547, 37.6215),
        ];

        let survivors = Deduplicator::merge(&[place], &external);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].provider_id, "g2");
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let internal = vec![sample_place("p1", "red SQUARE", Some("55.7539,37.6208"))];
        let external = vec![sample_external("g1", "Red Square", 55.7539, 37.6208)];
        assert!(Deduplicator::merge(&internal, &external).is_empty());
    }

    #[test]
    fn test_same_name_too_far_survives() {
        let internal = vec![sample_place("p1", "Central Park", Some("40.7812,-73.9665"))];
        let external = vec![sample_external("g1", "Central Park", 40.7830, -73.9665)];
        assert_eq!(Deduplicator::merge(&internal, &external).len(), 1);
    }

    #[test]
    fn test_same_name_without_internal_coordinate_survives() {
        let internal = vec![sample_place("p1", "Red Square", Some("garbage"))];
        let external = vec![sample_external("g1", "Red Square", 55.7540, 37.6209)];
        assert_eq!(Deduplicator::merge(&internal, &external).len(), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let internal = vec![
            sample_place("p1", "Red Square", Some("55.7539,37.6208")),
            sample_place("p2", "Bolshoi", Some("55.7601,37.6186")),
        ];
        let external = vec![
            sample_external("g1", "Red Square", 55.7540, 37.6209),
            sample_external("g2", "GUM", 55.7547, 37.6215),
            sample_external("g3", "Kazan Cathedral", 55.7555, 37.6193),
        ];

        let once = Deduplicator::merge(&internal, &external);
        let twice = Deduplicator::merge(&internal, &once);
        assert_eq!(once, twice);
        assert_eq!(once, Deduplicator::merge(&internal, &external));
        assert_eq!(once.len(), 2);
    }
}
