//! Request and response bodies for the HTTP surface.

use kiln_training::TrainingParams;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to materialize and store a training configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateConfigRequest {
    #[validate(length(min = 1))]
    pub dataset_dir: String,
    #[validate(length(min = 1))]
    pub model_name_or_path: String,
    #[validate(length(min = 1))]
    pub output_dir: String,
    #[validate(length(min = 1))]
    pub dataset: String,
    pub training_config: TrainingParams,
}

/// Request to start a training job from a stored config.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartTrainingRequest {
    #[validate(length(min = 1))]
    pub config_gcs_url: String,
}

/// Request to deploy an already-registered model.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeployModelRequest {
    #[validate(length(min = 1))]
    pub model_id: String,
    #[serde(default = "default_machine_type")]
    pub machine_type: String,
    #[serde(default = "default_replica_count")]
    pub min_replica_count: u32,
    #[serde(default = "default_replica_count")]
    pub max_replica_count: u32,
}

fn default_machine_type() -> String {
    "n1-standard-2".to_string()
}

fn default_replica_count() -> u32 {
    1
}

/// Request to deploy a model behind a vLLM serving container.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VllmDeployRequest {
    #[validate(length(min = 1))]
    pub model_name: String,
    #[validate(length(min = 1))]
    pub model_id: String,
    #[validate(length(min = 1))]
    pub service_account: String,
    #[serde(default = "default_vllm_machine_type")]
    pub machine_type: String,
    #[serde(default = "default_accelerator_type")]
    pub accelerator_type: String,
    #[serde(default = "default_one")]
    pub accelerator_count: u32,
    #[serde(default = "default_gpu_memory_utilization")]
    pub gpu_memory_utilization: f64,
    #[serde(default = "default_max_model_len")]
    pub max_model_len: u32,
    #[serde(default = "default_dtype")]
    pub dtype: String,
    #[serde(default)]
    pub enable_trust_remote_code: bool,
    #[serde(default)]
    pub enforce_eager: bool,
    #[serde(default)]
    pub enable_lora: bool,
    #[serde(default = "default_one")]
    pub max_loras: u32,
    #[serde(default = "default_max_cpu_loras")]
    pub max_cpu_loras: u32,
    #[serde(default = "default_max_num_seqs")]
    pub max_num_seqs: u32,
    #[serde(default)]
    pub model_type: Option<String>,
}

fn default_vllm_machine_type() -> String {
    "g2-standard-8".to_string()
}

fn default_accelerator_type() -> String {
    "NVIDIA_L4".to_string()
}

fn default_one() -> u32 {
    1
}

fn default_gpu_memory_utilization() -> f64 {
    0.9
}

fn default_max_model_len() -> u32 {
    4096
}

fn default_dtype() -> String {
    "auto".to_string()
}

fn default_max_cpu_loras() -> u32 {
    8
}

fn default_max_num_seqs() -> u32 {
    256
}

/// An upload/config-generation acknowledgement carrying the store URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObjectResponse {
    pub message: String,
    pub gcs_url: String,
}

/// A job-submission acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSubmittedResponse {
    pub message: String,
    pub job_id: String,
}

/// An endpoint-deployment acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSubmittedResponse {
    pub message: String,
    pub endpoint_id: String,
}
