//! Endpoint and model serving client.

use super::{authorize, resource_id, send, VertexConfig};
use async_trait::async_trait;
use kiln_abstraction::{
    DeploySpec, DeployedModel, EndpointDescriptor, ModelUploadSpec, PlatformError,
    PrivateEndpoints, ServingPlatform,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

/// Serving platform client over the Vertex endpoints/models REST surface.
#[derive(Debug, Clone)]
pub struct VertexServing {
    client: Client,
    config: VertexConfig,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadOperation {
    name: String,
    #[serde(default)]
    metadata: Option<UploadMetadata>,
}

#[derive(Debug, Deserialize)]
struct UploadMetadata {
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointBody {
    #[serde(default)]
    deployed_models: Vec<DeployedModelBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployedModelBody {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    service_account: Option<String>,
    #[serde(default)]
    private_endpoints: Option<PrivateEndpointsBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrivateEndpointsBody {
    #[serde(default)]
    predict_http_uri: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MachineSpecBody {
    machine_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    accelerator_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accelerator_count: Option<u32>,
}

impl VertexServing {
    #[must_use]
    pub fn new(config: VertexConfig) -> Self {
        Self { client: Client::new(), config }
    }

    fn endpoints_url(&self) -> String {
        format!("{}/{}/endpoints", self.config.api_base(), self.config.parent())
    }

    fn models_url(&self) -> String {
        format!("{}/{}/models", self.config.api_base(), self.config.parent())
    }

    fn token(&self) -> Option<&String> {
        self.config.access_token.as_ref()
    }
}

#[async_trait]
impl ServingPlatform for VertexServing {
    async fn create_endpoint(&self, display_name: &str) -> Result<String, PlatformError> {
        debug!(display_name, "creating endpoint");

        let body = json!({ "displayName": display_name });
        let req = authorize(self.client.post(self.endpoints_url()).json(&body), self.token());
        let response = send(req, display_name).await?;

        let endpoint: NamedResource = response.json().await.map_err(|e| {
            PlatformError::Collaborator(format!("failed to parse endpoint response: {e}"))
        })?;

        let endpoint_id = resource_id(&endpoint.name);
        info!(endpoint_id = %endpoint_id, "endpoint created");
        Ok(endpoint_id)
    }

    async fn upload_model(&self, spec: &ModelUploadSpec) -> Result<String, PlatformError> {
        debug!(display_name = %spec.display_name, "uploading model");

        let env: Vec<_> = spec
            .env
            .iter()
            .map(|e| json!({ "name": e.name, "value": e.value }))
            .collect();
        let body = json!({
            "model": {
                "displayName": spec.display_name,
                "containerSpec": {
                    "imageUri": spec.serving_image_uri,
                    "args": spec.serving_args,
                    "ports": [{ "containerPort": spec.serving_port }],
                    "predictRoute": spec.predict_route,
                    "healthRoute": spec.health_route,
                    "env": env,
                    "sharedMemorySizeMb": spec.shared_memory_mb.to_string(),
                    "deploymentTimeout": format!("{}s", spec.deploy_timeout_secs),
                },
            },
        });

        let url = format!("{}:upload", self.models_url());
        let req = authorize(self.client.post(&url).json(&body), self.token());
        let response = send(req, &spec.display_name).await?;

        let operation: UploadOperation = response.json().await.map_err(|e| {
            PlatformError::Collaborator(format!("failed to parse upload response: {e}"))
        })?;

        // The upload is a long-running operation; the model resource name is
        // carried in the operation metadata.
        operation.metadata.and_then(|m| m.model).ok_or_else(|| {
            PlatformError::Collaborator(format!(
                "model upload operation {} returned no model resource",
                operation.name
            ))
        })
    }

    async fn deploy_model(&self, spec: &DeploySpec) -> Result<(), PlatformError> {
        debug!(
            endpoint_id = %spec.endpoint_id,
            model = %spec.model_name,
            "deploying model to endpoint"
        );

        let machine_spec = MachineSpecBody {
            machine_type: spec.machine_type.clone(),
            accelerator_type: spec.accelerator.as_ref().map(|(t, _)| t.clone()),
            accelerator_count: spec.accelerator.as_ref().map(|(_, c)| *c),
        };
        let mut deployed_model = json!({
            "model": spec.model_name,
            "displayName": spec.deployed_model_display_name,
            "dedicatedResources": {
                "machineSpec": machine_spec,
                "minReplicaCount": spec.min_replica_count,
                "maxReplicaCount": spec.max_replica_count,
            },
        });
        if let Some(service_account) = &spec.service_account {
            deployed_model["serviceAccount"] = json!(service_account);
        }

        let body = json!({
            "deployedModel": deployed_model,
            // Route all traffic to the fresh deployment ("0" = the one being added).
            "trafficSplit": { "0": spec.traffic_percentage },
        });

        let url = format!("{}/{}:deployModel", self.endpoints_url(), spec.endpoint_id);
        let req = authorize(self.client.post(&url).json(&body), self.token());

        // Deployment is asynchronous on the platform side; accepting the
        // operation is success here. Serving readiness is polled separately.
        send(req, &spec.endpoint_id).await?;
        info!(endpoint_id = %spec.endpoint_id, "deployment request accepted");
        Ok(())
    }

    async fn get_endpoint(&self, endpoint_id: &str) -> Result<EndpointDescriptor, PlatformError> {
        let url = format!("{}/{endpoint_id}", self.endpoints_url());
        let req = authorize(self.client.get(&url), self.token());
        let response = send(req, endpoint_id).await?;

        let endpoint: EndpointBody = response.json().await.map_err(|e| {
            PlatformError::Collaborator(format!("failed to parse endpoint response: {e}"))
        })?;

        Ok(EndpointDescriptor {
            deployed_models: endpoint
                .deployed_models
                .into_iter()
                .map(|m| DeployedModel {
                    display_name: m.display_name,
                    service_account: m.service_account,
                    private_endpoints: m
                        .private_endpoints
                        .map(|p| PrivateEndpoints { predict_http_uri: p.predict_http_uri }),
                })
                .collect(),
        })
    }
}
