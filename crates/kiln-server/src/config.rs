//! Environment-driven settings, built once at startup and passed into each
//! collaborator constructor.

use anyhow::{bail, Result};
use std::env;
use std::net::SocketAddr;

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Object store bucket holding datasets and training configs.
    pub bucket: String,
    /// Cloud project the training/serving platform runs in.
    pub project_id: String,
    /// Platform region.
    pub location: String,
    /// Training container image. A `{PROJECT_ID}` placeholder is substituted
    /// with the configured project.
    pub model_image_uri: String,
    /// Hugging Face token forwarded into training and serving containers.
    pub hf_token: Option<String>,
    /// Service account attached to deployed models.
    pub service_account: Option<String>,
    /// OAuth2 bearer token for the store and platform APIs.
    pub access_token: Option<String>,
    /// Bind address for the HTTP server.
    pub address: SocketAddr,
}

fn default_address() -> SocketAddr {
    // Compile-time constant, safe to unwrap.
    "127.0.0.1:8080".parse().expect("valid default address")
}

impl Settings {
    /// Loads settings from the environment. `GCS_BUCKET_NAME` and
    /// `PROJECT_ID` are required; everything else has a default or is
    /// optional.
    pub fn from_env() -> Result<Self> {
        let Ok(bucket) = env::var("GCS_BUCKET_NAME") else {
            bail!("GCS_BUCKET_NAME environment variable not set");
        };
        let Ok(project_id) = env::var("PROJECT_ID") else {
            bail!("PROJECT_ID environment variable not set");
        };

        let location = env::var("LOCATION").unwrap_or_else(|_| "us-central1".to_string());
        let model_image_uri = env::var("MODEL_IMAGE_URI").unwrap_or_else(|_| {
            "us-central1-docker.pkg.dev/{PROJECT_ID}/llamafactory/llama-factory:latest"
                .to_string()
        });
        let address = match env::var("KILN_ADDRESS") {
            Ok(addr) => addr.parse()?,
            Err(_) => default_address(),
        };

        let settings = Self {
            model_image_uri: model_image_uri.replace("{PROJECT_ID}", &project_id),
            bucket,
            project_id,
            location,
            hf_token: env::var("HF_TOKEN").ok(),
            service_account: env::var("SERVICE_ACCOUNT").ok(),
            access_token: env::var("PLATFORM_ACCESS_TOKEN").ok(),
            address,
        };
        Ok(settings)
    }
}
