// src/models/marker.rs
// DOCUMENTATION: Map markers handed to the rendering layer
// PURPOSE: Source-tagged marker records and their GeoJSON export

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};

use super::{ExternalPlace, Place};

/// Which catalog a marker came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSource {
    Internal,
    External,
}

impl MarkerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerSource::Internal => "internal",
            MarkerSource::External => "external",
        }
    }
}

/// Identity of a marker as reported back by the mapping layer on press
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerRef {
    pub source: MarkerSource,
    pub id: String,
}

impl MarkerRef {
    pub fn internal(id: impl Into<String>) -> Self {
        Self {
            source: MarkerSource::Internal,
            id: id.into(),
        }
    }

    pub fn external(id: impl Into<String>) -> Self {
        Self {
            source: MarkerSource::External,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub source: MarkerSource,
    pub id: String,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Marker {
    /// None when the place has no usable coordinate
    pub fn from_place(place: &Place) -> Option<Self> {
        let point = place.coordinate()?;
        Some(Self {
            source: MarkerSource::Internal,
            id: place.id.clone(),
            title: place.title.clone(),
            latitude: point.y(),
            longitude: point.x(),
        })
    }

    pub fn from_external(place: &ExternalPlace) -> Self {
        Self {
            source: MarkerSource::External,
            id: place.provider_id.clone(),
            title: place.name.clone(),
            latitude: place.latitude,
            longitude: place.longitude,
        }
    }

    fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("source".to_string(), self.source.as_str().into());
        properties.insert("id".to_string(), self.id.clone().into());
        properties.insert("title".to_string(), self.title.clone().into());

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![self.longitude, self.latitude]))),
            id: Some(Id::String(format!("{}-{}", self.source.as_str(), self.id))),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Markers visible for the current zoom level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerSet {
    pub internal: Vec<Marker>,
    pub external: Vec<Marker>,
}

impl MarkerSet {
    /// Internal markers first
    fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.internal.iter().chain(self.external.iter())
    }

    /// Export as a GeoJSON FeatureCollection (internal markers first)
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.iter().map(Marker::to_feature).collect(),
            foreign_members: None,
        }
    }
}
