//! Mock training/serving platforms for tests.
//!
//! Submissions are recorded and queryable; states are seeded by the test.

use async_trait::async_trait;
use kiln_abstraction::{
    CustomJobSpec, DeploySpec, EndpointDescriptor, ModelUploadSpec, PlatformError, RawJob,
    ServingPlatform, TrainingPlatform,
};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Mock training platform: assigns sequential job ids and serves seeded
/// raw states.
#[derive(Debug, Default)]
pub struct MockTraining {
    submitted: Mutex<Vec<CustomJobSpec>>,
    jobs: Mutex<HashMap<String, RawJob>>,
}

impl MockTraining {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the raw state returned for `job_id`.
    pub async fn set_job(&self, job_id: &str, job: RawJob) {
        self.jobs.lock().await.insert(job_id.to_string(), job);
    }

    /// Specs submitted so far, in order.
    pub async fn submitted(&self) -> Vec<CustomJobSpec> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl TrainingPlatform for MockTraining {
    async fn submit_custom_job(&self, spec: &CustomJobSpec) -> Result<String, PlatformError> {
        let mut submitted = self.submitted.lock().await;
        submitted.push(spec.clone());
        let job_id = format!("job-{}", submitted.len());
        self.jobs.lock().await.insert(
            job_id.clone(),
            RawJob { state: "JOB_STATE_PENDING".to_string(), error_message: None },
        );
        Ok(job_id)
    }

    async fn get_job(&self, job_id: &str) -> Result<RawJob, PlatformError> {
        self.jobs
            .lock()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(job_id.to_string()))
    }
}

/// Mock serving platform: endpoints and uploads get sequential identifiers,
/// endpoint descriptors are seeded by the test.
#[derive(Debug, Default)]
pub struct MockServing {
    endpoints: Mutex<HashMap<String, EndpointDescriptor>>,
    uploads: Mutex<Vec<ModelUploadSpec>>,
    deployments: Mutex<Vec<DeploySpec>>,
}

impl MockServing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the descriptor returned for `endpoint_id`.
    pub async fn set_endpoint(&self, endpoint_id: &str, descriptor: EndpointDescriptor) {
        self.endpoints.lock().await.insert(endpoint_id.to_string(), descriptor);
    }

    pub async fn uploads(&self) -> Vec<ModelUploadSpec> {
        self.uploads.lock().await.clone()
    }

    pub async fn deployments(&self) -> Vec<DeploySpec> {
        self.deployments.lock().await.clone()
    }
}

#[async_trait]
impl ServingPlatform for MockServing {
    async fn create_endpoint(&self, _display_name: &str) -> Result<String, PlatformError> {
        let mut endpoints = self.endpoints.lock().await;
        let endpoint_id = format!("endpoint-{}", endpoints.len() + 1);
        endpoints.insert(endpoint_id.clone(), EndpointDescriptor::default());
        Ok(endpoint_id)
    }

    async fn upload_model(&self, spec: &ModelUploadSpec) -> Result<String, PlatformError> {
        let mut uploads = self.uploads.lock().await;
        uploads.push(spec.clone());
        Ok(format!("projects/mock/locations/mock/models/{}", uploads.len()))
    }

    async fn deploy_model(&self, spec: &DeploySpec) -> Result<(), PlatformError> {
        if !self.endpoints.lock().await.contains_key(&spec.endpoint_id) {
            return Err(PlatformError::NotFound(spec.endpoint_id.clone()));
        }
        self.deployments.lock().await.push(spec.clone());
        Ok(())
    }

    async fn get_endpoint(&self, endpoint_id: &str) -> Result<EndpointDescriptor, PlatformError> {
        self.endpoints
            .lock()
            .await
            .get(endpoint_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(endpoint_id.to_string()))
    }
}
