// src/services/session_registry.rs
// DOCUMENTATION: Map session registry
// PURPOSE: One ViewportController per open map screen, shared clients across sessions

use crate::errors::PlacesError;
use crate::services::{CatalogApi, ControllerSettings, PlaceProvider, ViewportController};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct SessionRegistry {
    catalog: Arc<dyn CatalogApi>,
    provider: Arc<dyn PlaceProvider>,
    settings: ControllerSettings,
    sessions: RwLock<HashMap<Uuid, ViewportController>>,
}

impl SessionRegistry {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        provider: Arc<dyn PlaceProvider>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            catalog,
            provider,
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a new session in the Idle phase
    pub async fn create(&self) -> (Uuid, ViewportController) {
        let id = Uuid::new_v4();
        let controller = ViewportController::new(
            self.catalog.clone(),
            self.provider.clone(),
            self.settings.clone(),
        );

        self.sessions.write().await.insert(id, controller.clone());
        log::info!("Opened map session {}", id);
        (id, controller)
    }

    pub async fn get(&self, id: Uuid) -> Result<ViewportController, PlacesError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PlacesError::NotFound(format!("session {}", id)))
    }

    /// Close a session and cancel its pending timers
    pub async fn remove(&self, id: Uuid) -> Result<(), PlacesError> {
        let controller = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| PlacesError::NotFound(format!("session {}", id)))?;

        controller.shutdown();
        log::info!("Closed map session {}", id);
        Ok(())
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
