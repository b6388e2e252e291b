//! Deployment routes: plain deploy, vLLM deploy, and status.

use crate::error::ApiError;
use crate::schemas::{DeployModelRequest, EndpointSubmittedResponse, VllmDeployRequest};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use kiln_abstraction::DeploySpec;
use kiln_platform::VllmDeployment;
use kiln_training::{normalize_deployment_status, DeploymentStatus};
use tracing::info;
use validator::Validate;

/// Display name stamped on models deployed through the plain deploy route;
/// the status route looks the same name back up.
pub const DEPLOYED_MODEL_DISPLAY_NAME: &str = "deployed-llm";

const ENDPOINT_DISPLAY_NAME: &str = "llm-endpoint";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/deploy", post(deploy_model))
        .route("/deploy_vllm", post(deploy_vllm))
        .route("/status/:endpoint_id", get(deployment_status))
}

/// Creates an endpoint and deploys a registered model to it. The platform
/// finishes the rollout asynchronously; poll the status route for liveness.
async fn deploy_model(
    State(state): State<AppState>,
    Json(req): Json<DeployModelRequest>,
) -> Result<Json<EndpointSubmittedResponse>, ApiError> {
    req.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let endpoint_id = state.serving.create_endpoint(ENDPOINT_DISPLAY_NAME).await?;
    state
        .serving
        .deploy_model(&DeploySpec {
            endpoint_id: endpoint_id.clone(),
            model_name: req.model_id,
            deployed_model_display_name: DEPLOYED_MODEL_DISPLAY_NAME.to_string(),
            machine_type: req.machine_type,
            accelerator: None,
            min_replica_count: req.min_replica_count,
            max_replica_count: req.max_replica_count,
            traffic_percentage: 100,
            service_account: None,
        })
        .await?;

    info!(endpoint_id = %endpoint_id, "deployment submitted");
    Ok(Json(EndpointSubmittedResponse {
        message: "Endpoint deployment job submitted".to_string(),
        endpoint_id,
    }))
}

/// Uploads a model behind a vLLM serving container and deploys it to a fresh
/// endpoint.
async fn deploy_vllm(
    State(state): State<AppState>,
    Json(req): Json<VllmDeployRequest>,
) -> Result<Json<EndpointSubmittedResponse>, ApiError> {
    req.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let deployment = VllmDeployment {
        model_name: req.model_name,
        model_id: req.model_id,
        machine_type: req.machine_type,
        accelerator_type: req.accelerator_type,
        accelerator_count: req.accelerator_count,
        gpu_memory_utilization: req.gpu_memory_utilization,
        max_model_len: req.max_model_len,
        dtype: req.dtype,
        enable_trust_remote_code: req.enable_trust_remote_code,
        enforce_eager: req.enforce_eager,
        enable_lora: req.enable_lora,
        max_loras: req.max_loras,
        max_cpu_loras: req.max_cpu_loras,
        max_num_seqs: req.max_num_seqs,
        model_type: req.model_type,
    };

    let endpoint_id = state.serving.create_endpoint(&deployment.endpoint_display_name()).await?;
    let upload = deployment.model_upload_spec(state.settings.hf_token.as_deref());
    let model_name = state.serving.upload_model(&upload).await?;

    state
        .serving
        .deploy_model(&DeploySpec {
            endpoint_id: endpoint_id.clone(),
            model_name,
            deployed_model_display_name: deployment.model_name.clone(),
            machine_type: deployment.machine_type.clone(),
            accelerator: Some((
                deployment.accelerator_type.clone(),
                deployment.accelerator_count,
            )),
            min_replica_count: 1,
            max_replica_count: 1,
            traffic_percentage: 100,
            service_account: Some(req.service_account),
        })
        .await?;

    info!(endpoint_id = %endpoint_id, model = %deployment.model_name, "vLLM deployment submitted");
    Ok(Json(EndpointSubmittedResponse {
        message: "Endpoint deployment job submitted for vLLM model".to_string(),
        endpoint_id,
    }))
}

/// Normalized status of an endpoint deployment.
async fn deployment_status(
    State(state): State<AppState>,
    Path(endpoint_id): Path<String>,
) -> Result<Json<DeploymentStatus>, ApiError> {
    let endpoint = state.serving.get_endpoint(&endpoint_id).await?;
    Ok(Json(normalize_deployment_status(
        &endpoint_id,
        &endpoint,
        DEPLOYED_MODEL_DISPLAY_NAME,
    )))
}
