//! In-memory object store.
//!
//! Implements the full `ObjectStore` capability including generation tokens,
//! so compare-and-swap behavior is exercised in tests exactly as against the
//! real store. Also handy for local development without cloud credentials.

use async_trait::async_trait;
use kiln_abstraction::{FetchedObject, ObjectStore, StoreError, StoreObject, WritePrecondition};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    generation: i64,
}

/// Bucket-scoped in-memory store.
#[derive(Debug)]
pub struct MemoryStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    next_generation: Mutex<i64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
            next_generation: Mutex::new(1),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        precondition: WritePrecondition,
    ) -> Result<String, StoreError> {
        let mut objects = self.objects.lock().await;

        if let WritePrecondition::IfGenerationMatch(expected) = precondition {
            let current = objects.get(path).map_or(0, |o| o.generation);
            if current != expected {
                return Err(StoreError::Conflict(path.to_string()));
            }
        }

        let mut next = self.next_generation.lock().await;
        let generation = *next;
        *next += 1;
        objects.insert(path.to_string(), StoredObject { bytes, generation });
        Ok(self.url_for(path))
    }

    async fn get(&self, path: &str) -> Result<FetchedObject, StoreError> {
        let objects = self.objects.lock().await;
        objects
            .get(path)
            .map(|o| FetchedObject { bytes: o.bytes.clone(), generation: o.generation })
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoreObject>, StoreError> {
        let objects = self.objects.lock().await;
        Ok(objects
            .keys()
            .filter(|path| path.starts_with(prefix))
            .map(|path| StoreObject { filepath: path.clone(), gcs_url: self.url_for(path) })
            .collect())
    }

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        let objects = self.objects.lock().await;
        Ok(objects.contains_key(path))
    }
}
