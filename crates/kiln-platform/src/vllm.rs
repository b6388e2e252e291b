//! vLLM serving-container materialization.
//!
//! Turns deployment parameters into the serving container's argument list and
//! a `ModelUploadSpec`, mirroring the vLLM api_server CLI surface.

use kiln_abstraction::{EnvVar, ModelUploadSpec};

/// Serving image for vLLM deployments.
pub const VLLM_SERVING_IMAGE_URI: &str = "us-docker.pkg.dev/vertex-ai/vertex-vision-model-garden-dockers/pytorch-vllm-serve:20241212_0916_RC00";

const SERVING_PORT: u16 = 8080;
const SHARED_MEMORY_MB: u64 = 16 * 1024;
const DEPLOY_TIMEOUT_SECS: u64 = 7200;

/// Parameters of a vLLM model deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct VllmDeployment {
    pub model_name: String,
    pub model_id: String,
    pub machine_type: String,
    pub accelerator_type: String,
    pub accelerator_count: u32,
    pub gpu_memory_utilization: f64,
    pub max_model_len: u32,
    pub dtype: String,
    pub enable_trust_remote_code: bool,
    pub enforce_eager: bool,
    pub enable_lora: bool,
    pub max_loras: u32,
    pub max_cpu_loras: u32,
    pub max_num_seqs: u32,
    pub model_type: Option<String>,
}

impl VllmDeployment {
    /// The serving container's argument list. Tensor parallelism follows the
    /// accelerator count; feature flags are appended only when enabled.
    #[must_use]
    pub fn serving_args(&self) -> Vec<String> {
        let mut args = vec![
            "python".to_string(),
            "-m".to_string(),
            "vllm.entrypoints.api_server".to_string(),
            "--host=0.0.0.0".to_string(),
            format!("--port={SERVING_PORT}"),
            format!("--model={}", self.model_id),
            format!("--tensor-parallel-size={}", self.accelerator_count),
            "--swap-space=16".to_string(),
            format!("--gpu-memory-utilization={}", self.gpu_memory_utilization),
            format!("--max-model-len={}", self.max_model_len),
            format!("--dtype={}", self.dtype),
            format!("--max-loras={}", self.max_loras),
            format!("--max-cpu-loras={}", self.max_cpu_loras),
            format!("--max-num-seqs={}", self.max_num_seqs),
            "--disable-log-stats".to_string(),
        ];

        if self.enable_trust_remote_code {
            args.push("--trust-remote-code".to_string());
        }
        if self.enforce_eager {
            args.push("--enforce-eager".to_string());
        }
        if self.enable_lora {
            args.push("--enable-lora".to_string());
        }
        if let Some(model_type) = &self.model_type {
            args.push(format!("--model-type={model_type}"));
        }

        args
    }

    /// The model upload for this deployment. `hf_token` is forwarded into the
    /// serving container's environment when present.
    #[must_use]
    pub fn model_upload_spec(&self, hf_token: Option<&str>) -> ModelUploadSpec {
        let mut env = vec![
            EnvVar::new("MODEL_ID", self.model_id.clone()),
            EnvVar::new("DEPLOY_SOURCE", "api"),
        ];
        if let Some(token) = hf_token {
            env.push(EnvVar::new("HF_TOKEN", token));
        }

        ModelUploadSpec {
            display_name: self.model_name.clone(),
            serving_image_uri: VLLM_SERVING_IMAGE_URI.to_string(),
            serving_args: self.serving_args(),
            serving_port: SERVING_PORT,
            predict_route: "/generate".to_string(),
            health_route: "/ping".to_string(),
            env,
            shared_memory_mb: SHARED_MEMORY_MB,
            deploy_timeout_secs: DEPLOY_TIMEOUT_SECS,
        }
    }

    /// Display name of the endpoint fronting this deployment.
    #[must_use]
    pub fn endpoint_display_name(&self) -> String {
        format!("{}-endpoint", self.model_name)
    }
}
