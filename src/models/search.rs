// src/models/search.rs
// DOCUMENTATION: Free-text search parameters and client-side ordering
// PURPOSE: Shared by provider text search and the catalog's text mode

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::Place;

/// Free-text query with an optional rating floor
/// DOCUMENTATION: An empty (or whitespace) query means an empty result and no network call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub min_rating: Option<f32>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            min_rating: None,
        }
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.trimmed().is_empty()
    }

    /// Whether a rating passes the threshold (missing ratings count as 0)
    pub fn accepts_rating(&self, rating: f32) -> bool {
        match self.min_rating {
            Some(min) => rating >= min,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Relevance,
    Rating,
    Name,
    Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Relevance => "relevance",
            SortOption::Rating => "rating",
            SortOption::Name => "name",
            SortOption::Date => "date",
        }
    }
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Catalog text search: query plus ordering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSearch {
    #[serde(flatten)]
    pub query: SearchQuery,
    #[serde(default)]
    pub sort_by: SortOption,
    #[serde(default)]
    pub order: SortOrder,
}

/// Order places client-side
/// DOCUMENTATION: Relevance ranks titles containing the query first and keeps the
/// server's order within each group, whatever the requested order. The sort is stable.
pub fn sort_places(places: &mut [Place], query: &str, sort_by: SortOption, order: SortOrder) {
    if sort_by == SortOption::Relevance {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return;
        }
        places.sort_by_key(|p| !p.title.to_lowercase().contains(&needle));
        return;
    }

    places.sort_by(|a, b| {
        let ordering = match sort_by {
            SortOption::Rating => a
                .average_rating
                .partial_cmp(&b.average_rating)
                .unwrap_or(Ordering::Equal),
            SortOption::Name => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOption::Date => a.created_at.cmp(&b.created_at),
            SortOption::Relevance => Ordering::Equal,
        };

        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::place::sample_place;

    #[test]
    fn test_empty_query() {
        assert!(SearchQuery::new("   ").is_empty());
        assert!(!SearchQuery::new(" cathedral ").is_empty());
        assert_eq!(SearchQuery::new(" cathedral ").trimmed(), "cathedral");
    }

    #[test]
    fn test_rating_threshold() {
        let mut query = SearchQuery::new("museum");
        assert!(query.accepts_rating(0.0));
        query.min_rating = Some(4.0);
        assert!(query.accepts_rating(4.0));
        assert!(!query.accepts_rating(3.9));
    }

    #[test]
    fn test_sort_by_rating_desc() {
        let mut a = sample_place("a", "Alpha", None);
        a.average_rating = 2.0;
        let mut b = sample_place("b", "beta", None);
        b.average_rating = 4.5;
        let mut places = vec![a, b];

        sort_places(&mut places, "", SortOption::Rating, SortOrder::Desc);
        assert_eq!(places[0].id, "b");

        sort_places(&mut places, "", SortOption::Name, SortOrder::Asc);
        assert_eq!(places[0].id, "a");
    }

    #[test]
    fn test_relevance_without_query_keeps_order() {
        let mut places = vec![sample_place("z", "Zed", None), sample_place("a", "Alpha", None)];
        sort_places(&mut places, "  ", SortOption::Relevance, SortOrder::Asc);
        assert_eq!(places[0].id, "z");
    }

    #[test]
    fn test_relevance_ranks_title_matches_first() {
        let mut places = vec![
            sample_place("a", "Red Square", None),
            sample_place("b", "Kremlin Armoury", None),
            sample_place("c", "Bolshoi", None),
            sample_place("d", "The kremlin", None),
        ];

        sort_places(&mut places, "Kremlin", SortOption::Relevance, SortOrder::Desc);
        let ids: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }
}
