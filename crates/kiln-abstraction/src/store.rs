//! Object store capability.
//!
//! The store is a flat namespace of blobs inside one bucket. Writes can carry
//! a generation precondition so read-modify-write callers (the dataset
//! registry updater) get compare-and-swap instead of last-writer-wins.

use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One listed object: its bucket-relative path plus the fully-qualified URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreObject {
    pub filepath: String,
    pub gcs_url: String,
}

/// An object fetched from the store, with the generation token it was read at.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub bytes: Vec<u8>,
    /// Monotonic per-object version assigned by the store on every write.
    pub generation: i64,
}

/// Precondition attached to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePrecondition {
    /// Unconditional overwrite.
    None,
    /// Write succeeds only if the object's current generation matches.
    /// Generation 0 means the object must not exist yet.
    IfGenerationMatch(i64),
}

/// Capability interface for the object store collaborator.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// The bucket this store is scoped to.
    fn bucket(&self) -> &str;

    /// Uploads `bytes` at `path`, returning the object's store URL.
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        precondition: WritePrecondition,
    ) -> Result<String, StoreError>;

    /// Downloads the object at `path` together with its generation.
    async fn get(&self, path: &str) -> Result<FetchedObject, StoreError>;

    /// Lists objects under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<StoreObject>, StoreError>;

    /// Whether an object exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, StoreError>;

    /// Uploads a string at `path`. Convenience over [`ObjectStore::put`].
    async fn put_string(
        &self,
        path: &str,
        content: &str,
        precondition: WritePrecondition,
    ) -> Result<String, StoreError> {
        self.put(path, content.as_bytes().to_vec(), precondition).await
    }

    /// The fully-qualified URL for a bucket-relative path.
    fn url_for(&self, path: &str) -> String {
        format!("gs://{}/{}", self.bucket(), path)
    }
}

/// A validated, fully-qualified object locator scoped to one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocator {
    bucket: String,
    object: String,
}

impl StoreLocator {
    /// Parses `gs://<bucket>/<object>` and rejects locators that do not sit
    /// inside `expected_bucket`.
    pub fn parse(url: &str, expected_bucket: &str) -> Result<Self, StoreError> {
        let prefix = format!("gs://{expected_bucket}/");
        let object = url
            .strip_prefix(&prefix)
            .ok_or_else(|| StoreError::InvalidReference(url.to_string()))?;
        if object.is_empty() {
            return Err(StoreError::InvalidReference(url.to_string()));
        }
        Ok(Self { bucket: expected_bucket.to_string(), object: object.to_string() })
    }

    /// The bucket-relative object path.
    #[must_use]
    pub fn object(&self) -> &str {
        &self.object
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The fully-qualified `gs://` URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.object)
    }
}

impl std::fmt::Display for StoreLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_parse_accepts_configured_bucket() {
        let loc = StoreLocator::parse("gs://my-bucket/datasets/foo.csv", "my-bucket").unwrap();
        assert_eq!(loc.object(), "datasets/foo.csv");
        assert_eq!(loc.url(), "gs://my-bucket/datasets/foo.csv");
    }

    #[test]
    fn test_locator_parse_rejects_wrong_bucket() {
        let err = StoreLocator::parse("gs://other-bucket/datasets/foo.csv", "my-bucket")
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference(_)));
    }

    #[test]
    fn test_locator_parse_rejects_non_gs_scheme() {
        let err = StoreLocator::parse("s3://my-bucket/datasets/foo.csv", "my-bucket").unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference(_)));
    }

    #[test]
    fn test_locator_parse_rejects_bare_bucket() {
        let err = StoreLocator::parse("gs://my-bucket/", "my-bucket").unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference(_)));
    }
}
