//! Custom training job client.

use super::{authorize, resource_id, send, VertexConfig};
use async_trait::async_trait;
use kiln_abstraction::{CustomJobSpec, PlatformError, RawJob, TrainingPlatform};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Training platform client over the Vertex custom-jobs REST surface.
#[derive(Debug, Clone)]
pub struct VertexJobs {
    client: Client,
    config: VertexConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomJobBody {
    display_name: String,
    job_spec: JobSpecBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobSpecBody {
    worker_pool_specs: Vec<WorkerPoolSpec>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkerPoolSpec {
    machine_spec: MachineSpecBody,
    replica_count: u32,
    container_spec: ContainerSpecBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MachineSpecBody {
    machine_type: String,
    accelerator_type: String,
    accelerator_count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerSpecBody {
    image_uri: String,
    command: Vec<String>,
    env: Vec<EnvBody>,
}

#[derive(Debug, Serialize)]
struct EnvBody {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobResponse {
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<JobError>,
}

#[derive(Debug, Deserialize)]
struct JobError {
    #[serde(default)]
    message: Option<String>,
}

impl VertexJobs {
    #[must_use]
    pub fn new(config: VertexConfig) -> Self {
        Self { client: Client::new(), config }
    }

    fn jobs_url(&self) -> String {
        format!("{}/{}/customJobs", self.config.api_base(), self.config.parent())
    }
}

#[async_trait]
impl TrainingPlatform for VertexJobs {
    async fn submit_custom_job(&self, spec: &CustomJobSpec) -> Result<String, PlatformError> {
        debug!(display_name = %spec.display_name, "submitting custom job");

        let body = CustomJobBody {
            display_name: spec.display_name.clone(),
            job_spec: JobSpecBody {
                worker_pool_specs: vec![WorkerPoolSpec {
                    machine_spec: MachineSpecBody {
                        machine_type: spec.machine.machine_type.clone(),
                        accelerator_type: spec.machine.accelerator_type.clone(),
                        accelerator_count: spec.machine.accelerator_count,
                    },
                    replica_count: spec.replica_count,
                    container_spec: ContainerSpecBody {
                        image_uri: spec.container.image_uri.clone(),
                        command: spec.container.command.clone(),
                        env: spec
                            .container
                            .env
                            .iter()
                            .map(|e| EnvBody { name: e.name.clone(), value: e.value.clone() })
                            .collect(),
                    },
                }],
            },
        };

        let req = authorize(
            self.client.post(self.jobs_url()).json(&body),
            self.config.access_token.as_ref(),
        );
        let response = send(req, &spec.display_name).await?;

        let job: JobResponse = response.json().await.map_err(|e| {
            PlatformError::Collaborator(format!("failed to parse job response: {e}"))
        })?;

        let job_id = resource_id(&job.name);
        info!(job_id = %job_id, "custom job submitted");
        Ok(job_id)
    }

    async fn get_job(&self, job_id: &str) -> Result<RawJob, PlatformError> {
        let url = format!("{}/{job_id}", self.jobs_url());
        let req = authorize(self.client.get(&url), self.config.access_token.as_ref());
        let response = send(req, job_id).await?;

        let job: JobResponse = response.json().await.map_err(|e| {
            PlatformError::Collaborator(format!("failed to parse job response: {e}"))
        })?;

        Ok(RawJob {
            state: job.state.unwrap_or_else(|| "JOB_STATE_UNSPECIFIED".to_string()),
            error_message: job.error.and_then(|e| e.message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_url_shape() {
        let jobs = VertexJobs::new(VertexConfig::new("proj", "us-central1"));
        assert_eq!(
            jobs.jobs_url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/proj/locations/us-central1/customJobs"
        );
    }
}
