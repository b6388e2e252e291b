//! Kiln Server - Entry Point
//!
//! Starts the fine-tuning control-plane HTTP server.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiln_platform::{GcsStore, VertexConfig, VertexJobs, VertexServing};
use kiln_server::{router, AppState, Settings};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiln_server=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(settings).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = GcsStore::new(settings.bucket.clone(), settings.access_token.clone());

    let mut vertex = VertexConfig::new(settings.project_id.clone(), settings.location.clone());
    if let Some(token) = &settings.access_token {
        vertex = vertex.with_access_token(token.clone());
    }
    let training = VertexJobs::new(vertex.clone());
    let serving = VertexServing::new(vertex);

    let address = settings.address;
    let state =
        AppState::new(Arc::new(store), Arc::new(training), Arc::new(serving), settings);

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!(address = %address, "kiln server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
