//! Kiln Server
//!
//! The HTTP control plane: dataset upload/listing, training-config
//! generation, custom-job submission and status, and model deployment. All
//! real work is delegated to the collaborator traits in `kiln-abstraction`
//! and the domain logic in `kiln-training`.

pub mod config;
pub mod error;
pub mod jobs;
pub mod routes;
pub mod schemas;
pub mod state;

pub use config::Settings;
pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Assembles the full API router over an application state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/datasets", routes::datasets::router())
        .nest("/training", routes::training::router())
        .nest("/deployment", routes::deployment::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
