//! Training and serving platform capabilities.
//!
//! These traits mirror the slice of a managed ML platform the control plane
//! actually uses: submit/inspect custom training jobs, and create/populate
//! inference endpoints. The descriptor types carry only the fields the status
//! normalizer in `kiln-training` reads.

use crate::error::PlatformError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A named environment variable passed into a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Compute shape for a worker or deployed replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSpec {
    pub machine_type: String,
    pub accelerator_type: String,
    pub accelerator_count: u32,
}

/// Container image plus command for a training worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub image_uri: String,
    pub command: Vec<String>,
    pub env: Vec<EnvVar>,
}

/// A custom training job submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomJobSpec {
    pub display_name: String,
    pub machine: MachineSpec,
    pub replica_count: u32,
    pub container: ContainerSpec,
}

/// Raw job state as reported by the platform, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawJob {
    /// Platform-specific state token, e.g. `JOB_STATE_RUNNING`. The
    /// enumeration is open-ended on the platform side.
    pub state: String,
    /// Error message, present when the platform reports one.
    pub error_message: Option<String>,
}

/// Capability interface for the managed training platform.
#[async_trait]
pub trait TrainingPlatform: Send + Sync {
    /// Submits a custom job and returns its platform-assigned identifier.
    async fn submit_custom_job(&self, spec: &CustomJobSpec) -> Result<String, PlatformError>;

    /// Fetches the raw state of a job by identifier.
    async fn get_job(&self, job_id: &str) -> Result<RawJob, PlatformError>;
}

/// A model upload: serving container plus its runtime wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUploadSpec {
    pub display_name: String,
    pub serving_image_uri: String,
    pub serving_args: Vec<String>,
    pub serving_port: u16,
    pub predict_route: String,
    pub health_route: String,
    pub env: Vec<EnvVar>,
    pub shared_memory_mb: u64,
    pub deploy_timeout_secs: u64,
}

/// A deploy-model request against an existing endpoint.
///
/// Deployment is asynchronous on the platform side: the call returns once the
/// request is accepted, not once serving is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploySpec {
    pub endpoint_id: String,
    /// Platform resource name of the uploaded/registered model.
    pub model_name: String,
    pub deployed_model_display_name: String,
    pub machine_type: String,
    /// Accelerator shape, absent for CPU-only deployments.
    pub accelerator: Option<(String, u32)>,
    pub min_replica_count: u32,
    pub max_replica_count: u32,
    pub traffic_percentage: u32,
    pub service_account: Option<String>,
}

/// Private serving addresses of a deployed model, when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateEndpoints {
    pub predict_http_uri: Option<String>,
}

/// One deployed model inside an endpoint descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedModel {
    pub display_name: String,
    pub service_account: Option<String>,
    pub private_endpoints: Option<PrivateEndpoints>,
}

/// An endpoint as described by the serving platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub deployed_models: Vec<DeployedModel>,
}

/// Capability interface for the managed serving platform.
#[async_trait]
pub trait ServingPlatform: Send + Sync {
    /// Creates an endpoint and returns its identifier.
    async fn create_endpoint(&self, display_name: &str) -> Result<String, PlatformError>;

    /// Uploads a model and returns its platform resource name.
    async fn upload_model(&self, spec: &ModelUploadSpec) -> Result<String, PlatformError>;

    /// Deploys a model to an endpoint. Returns once the request is accepted.
    async fn deploy_model(&self, spec: &DeploySpec) -> Result<(), PlatformError>;

    /// Fetches an endpoint's deployed-model descriptors.
    async fn get_endpoint(&self, endpoint_id: &str) -> Result<EndpointDescriptor, PlatformError>;
}
