// src/services/selection.rs
// DOCUMENTATION: Selected-marker state machine
// PURPOSE: At most one info panel open at a time, driven by explicit press events

use serde::{Deserialize, Serialize};

use crate::models::{ExternalPlace, MarkerRef, Place};

/// Which place, if any, is open
/// DOCUMENTATION: The three states are mutually exclusive by construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "place", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    None,
    SelectedInternal(Place),
    SelectedExternal(ExternalPlace),
}

/// Press events delivered by the mapping layer itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum MapPress {
    Marker { marker: MarkerRef },
    Background,
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// Marker key of the current selection
    pub fn marker_ref(&self) -> Option<MarkerRef> {
        match self {
            Selection::None => None,
            Selection::SelectedInternal(place) => Some(MarkerRef::internal(place.id.clone())),
            Selection::SelectedExternal(place) => {
                Some(MarkerRef::external(place.provider_id.clone()))
            }
        }
    }

    /// Apply a press event
    /// DOCUMENTATION: A marker press replaces the selection in one step. A marker
    /// that cannot be resolved in the current sets resets to None.
    pub fn on_press(
        &self,
        press: &MapPress,
        places: &[Place],
        externals: &[&[ExternalPlace]],
    ) -> Selection {
        match press {
            MapPress::Background => Selection::None,
            MapPress::Marker { marker } => match Self::resolve(marker, places, externals) {
                Some(selection) => selection,
                None => {
                    log::warn!(
                        "Pressed {} marker {} is not in the current set, clearing selection",
                        marker.source.as_str(),
                        marker.id
                    );
                    Selection::None
                }
            },
        }
    }

    /// Self-heal after the marker sets changed
    /// DOCUMENTATION: A selection referring to a place no longer present becomes None;
    /// one that is still present picks up the freshest copy of the place
    pub fn reconcile(&self, places: &[Place], externals: &[&[ExternalPlace]]) -> Selection {
        let Some(marker) = self.marker_ref() else {
            return Selection::None;
        };

        match Self::resolve(&marker, places, externals) {
            Some(fresh) => fresh,
            None => {
                log::warn!(
                    "Selected {} place {} left the current set, clearing selection",
                    marker.source.as_str(),
                    marker.id
                );
                Selection::None
            }
        }
    }

    fn resolve(
        marker: &MarkerRef,
        places: &[Place],
        externals: &[&[ExternalPlace]],
    ) -> Option<Selection> {
        use crate::models::MarkerSource;

        match marker.source {
            MarkerSource::Internal => places
                .iter()
                .find(|p| p.id == marker.id)
                .cloned()
                .map(Selection::SelectedInternal),
            MarkerSource::External => externals
                .iter()
                .flat_map(|set| set.iter())
                .find(|p| p.provider_id == marker.id)
                .cloned()
                .map(Selection::SelectedExternal),
        }
    }
}
