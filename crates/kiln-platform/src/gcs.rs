//! Object store implementation over the Cloud Storage JSON API.
//!
//! Uses media upload/download with `ifGenerationMatch` preconditions so the
//! registry updater gets compare-and-swap semantics. HTTP status mapping:
//! 404 -> `NotFound`, 412 -> `Conflict`, everything else non-2xx ->
//! `Collaborator` carrying the response text.

use async_trait::async_trait;
use kiln_abstraction::{FetchedObject, ObjectStore, StoreError, StoreObject, WritePrecondition};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};

const DEFAULT_API_BASE: &str = "https://storage.googleapis.com";

/// Object store client scoped to one bucket.
#[derive(Debug, Clone)]
pub struct GcsStore {
    client: Client,
    bucket: String,
    /// OAuth2 bearer token. Absent only works against unauthenticated
    /// emulators.
    access_token: Option<String>,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectMetadata>,
}

impl GcsStore {
    #[must_use]
    pub fn new(bucket: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            bucket: bucket.into(),
            access_token,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Points the client at a non-default API base, e.g. a local emulator.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.api_base,
            self.bucket,
            urlencoding::encode(path)
        )
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<reqwest::Response, StoreError> {
        let response = self.authorize(req).send().await.map_err(|e| {
            error!(error = %e, path, "store request failed");
            StoreError::Collaborator(format!("network error: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
        match status {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(path.to_string())),
            StatusCode::PRECONDITION_FAILED => Err(StoreError::Conflict(path.to_string())),
            _ => {
                error!(status = %status, error = %text, path, "store returned error status");
                Err(StoreError::Collaborator(format!("store error ({status}): {text}")))
            }
        }
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        precondition: WritePrecondition,
    ) -> Result<String, StoreError> {
        debug!(path, size = bytes.len(), "uploading object");

        let mut url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.api_base,
            self.bucket,
            urlencoding::encode(path)
        );
        if let WritePrecondition::IfGenerationMatch(generation) = precondition {
            url.push_str(&format!("&ifGenerationMatch={generation}"));
        }

        self.send(self.client.post(&url).body(bytes), path).await?;
        Ok(self.url_for(path))
    }

    async fn get(&self, path: &str) -> Result<FetchedObject, StoreError> {
        debug!(path, "downloading object");

        let url = format!("{}?alt=media", self.object_url(path));
        let response = self.send(self.client.get(&url), path).await?;

        // The media download carries the object generation in a header.
        let generation = response
            .headers()
            .get("x-goog-generation")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);

        let bytes = response.bytes().await.map_err(|e| {
            StoreError::Collaborator(format!("failed to read object body: {e}"))
        })?;

        Ok(FetchedObject { bytes: bytes.to_vec(), generation })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoreObject>, StoreError> {
        let url = format!(
            "{}/storage/v1/b/{}/o?prefix={}",
            self.api_base,
            self.bucket,
            urlencoding::encode(prefix)
        );
        let response = self.send(self.client.get(&url), prefix).await?;

        let listing: ListResponse = response.json().await.map_err(|e| {
            StoreError::Collaborator(format!("failed to parse listing: {e}"))
        })?;

        Ok(listing
            .items
            .into_iter()
            .map(|item| StoreObject {
                gcs_url: self.url_for(&item.name),
                filepath: item.name,
            })
            .collect())
    }

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        // Metadata fetch; only the status matters.
        match self.send(self.client.get(&self.object_url(path)), path).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_encodes_path() {
        let store = GcsStore::new("my-bucket", None);
        assert_eq!(
            store.object_url("datasets/foo.csv"),
            "https://storage.googleapis.com/storage/v1/b/my-bucket/o/datasets%2Ffoo.csv"
        );
    }

    #[test]
    fn test_url_for_is_fully_qualified() {
        let store = GcsStore::new("my-bucket", None);
        assert_eq!(store.url_for("datasets/foo.csv"), "gs://my-bucket/datasets/foo.csv");
    }
}
