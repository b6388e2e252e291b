//! Training routes: config generation/listing, job start, job status.

use crate::error::ApiError;
use crate::jobs::custom_job_for_config;
use crate::schemas::{GenerateConfigRequest, JobSubmittedResponse, StartTrainingRequest,
    StoredObjectResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use kiln_abstraction::{StoreLocator, StoreObject, WritePrecondition};
use kiln_training::{
    config_object_path, materialize_training_config, normalize_job_status, TrainingJobStatus,
};
use tracing::info;
use validator::Validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate_config", post(generate_config))
        .route("/configs", get(list_configs))
        .route("/start", post(start_training))
        .route("/status/:job_id", get(training_status))
}

/// Materializes a training configuration and stores it under a random suffix.
async fn generate_config(
    State(state): State<AppState>,
    Json(req): Json<GenerateConfigRequest>,
) -> Result<Json<StoredObjectResponse>, ApiError> {
    req.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let yaml = materialize_training_config(
        &req.dataset_dir,
        &req.model_name_or_path,
        &req.output_dir,
        &req.dataset,
        &req.training_config,
    )?;

    let suffix = format!("{:08x}", rand::random::<u32>());
    let path = config_object_path(&suffix);
    let gcs_url = state.store.put_string(&path, &yaml, WritePrecondition::None).await?;

    info!(path = %path, "training config stored");
    Ok(Json(StoredObjectResponse {
        message: format!("Training YAML uploaded to {gcs_url}"),
        gcs_url,
    }))
}

/// Lists all stored training configurations.
async fn list_configs(State(state): State<AppState>) -> Result<Json<Vec<StoreObject>>, ApiError> {
    let files = state.store.list("training_configs/").await?;
    Ok(Json(files))
}

/// Submits a custom training job for a stored config.
///
/// The config's existence is verified before any platform call: a bad locator
/// is a 400 and a missing config a 404, never a job submission.
async fn start_training(
    State(state): State<AppState>,
    Json(req): Json<StartTrainingRequest>,
) -> Result<Json<JobSubmittedResponse>, ApiError> {
    req.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let locator = StoreLocator::parse(&req.config_gcs_url, state.store.bucket())?;
    if !state.store.exists(locator.object()).await? {
        return Err(ApiError::NotFound(format!(
            "training config not found: {}",
            req.config_gcs_url
        )));
    }

    let job = custom_job_for_config(&state.settings, &locator);
    let job_id = state.training.submit_custom_job(&job).await?;

    info!(job_id = %job_id, config = %locator, "training job submitted");
    Ok(Json(JobSubmittedResponse {
        message: "Custom training job submitted".to_string(),
        job_id,
    }))
}

/// Normalized status of a training job.
async fn training_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<TrainingJobStatus>, ApiError> {
    let raw = state.training.get_job(&job_id).await?;
    Ok(Json(normalize_job_status(&job_id, &raw)))
}
