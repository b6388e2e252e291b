//! Shared application state: collaborator handles plus settings.

use crate::config::Settings;
use kiln_abstraction::{ObjectStore, ServingPlatform, TrainingPlatform};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub training: Arc<dyn TrainingPlatform>,
    pub serving: Arc<dyn ServingPlatform>,
    pub settings: Arc<Settings>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        training: Arc<dyn TrainingPlatform>,
        serving: Arc<dyn ServingPlatform>,
        settings: Settings,
    ) -> Self {
        Self { store, training, serving, settings: Arc::new(settings) }
    }
}
