//! Vertex AI REST clients for custom training jobs and serving endpoints.

mod jobs;
mod serving;

pub use jobs::VertexJobs;
pub use serving::VertexServing;

use kiln_abstraction::PlatformError;
use reqwest::StatusCode;
use tracing::error;

/// Connection parameters shared by the job and serving clients.
#[derive(Debug, Clone)]
pub struct VertexConfig {
    pub project_id: String,
    pub location: String,
    /// OAuth2 bearer token for the platform API.
    pub access_token: Option<String>,
    /// Regional API base, overridable for tests/emulators.
    pub api_base: Option<String>,
}

impl VertexConfig {
    #[must_use]
    pub fn new(project_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
            access_token: None,
            api_base: None,
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// `https://<location>-aiplatform.googleapis.com/v1` unless overridden.
    #[must_use]
    pub fn api_base(&self) -> String {
        self.api_base.clone().unwrap_or_else(|| {
            format!("https://{}-aiplatform.googleapis.com/v1", self.location)
        })
    }

    /// `projects/<project>/locations/<location>` resource parent.
    #[must_use]
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.location)
    }
}

/// The trailing segment of a platform resource name, which is the identifier
/// callers pass back in.
pub(crate) fn resource_id(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

pub(crate) fn authorize(
    req: reqwest::RequestBuilder,
    token: Option<&String>,
) -> reqwest::RequestBuilder {
    match token {
        Some(token) => req.bearer_auth(token),
        None => req,
    }
}

/// Sends a platform request and maps non-2xx statuses into the capability
/// error taxonomy: 404 -> `NotFound`, everything else -> `Collaborator`.
pub(crate) async fn send(
    req: reqwest::RequestBuilder,
    resource: &str,
) -> Result<reqwest::Response, PlatformError> {
    let response = req.send().await.map_err(|e| {
        error!(error = %e, resource, "platform request failed");
        PlatformError::Collaborator(format!("network error: {e}"))
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
    if status == StatusCode::NOT_FOUND {
        return Err(PlatformError::NotFound(resource.to_string()));
    }
    error!(status = %status, error = %text, resource, "platform returned error status");
    Err(PlatformError::Collaborator(format!("platform error ({status}): {text}")))
}
