//! Dataset registry: one shared JSON document mapping dataset name to
//! metadata, persisted in the object store.
//!
//! The update protocol is read-modify-write over the whole document. The
//! store's generation token turns that into compare-and-swap: a write only
//! lands if nobody else wrote between our read and our write, and we re-read
//! and retry on conflict. Entries are created or overwritten in full, never
//! deleted, and every write rewrites the entire document.

use crate::error::{TrainingError, TrainingResult};
use kiln_abstraction::{ObjectStore, StoreError, WritePrecondition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Well-known store path of the registry document.
pub const REGISTRY_PATH: &str = "datasets/dataset_info.json";

/// Conflict retries before the updater gives up.
const MAX_UPDATE_ATTEMPTS: u32 = 4;

/// One registry entry. Optional fields are omitted from the serialized
/// document when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatting: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<BTreeMap<String, String>>,
}

/// The registry document: dataset name -> entry.
pub type DatasetRegistry = BTreeMap<String, DatasetEntry>;

/// Derives the registry key from an uploaded file name: the base name with
/// its final extension stripped.
#[must_use]
pub fn dataset_name_for_file(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Creates or overwrites the entry for `dataset_name` and persists the full
/// registry back to [`REGISTRY_PATH`].
///
/// A missing registry document starts from an empty mapping (the write then
/// requires the object to still be absent). Any other fetch failure is
/// surfaced rather than treated as empty, so a transient store error cannot
/// silently truncate the registry. Concurrent updaters are serialized by the
/// generation precondition; after [`MAX_UPDATE_ATTEMPTS`] lost races the
/// conflict is surfaced to the caller.
pub async fn update_registry(
    store: &dyn ObjectStore,
    dataset_name: &str,
    file_name: &str,
    formatting: Option<String>,
    columns: Option<BTreeMap<String, String>>,
) -> TrainingResult<()> {
    let entry = DatasetEntry {
        file_name: file_name.to_string(),
        formatting: formatting.filter(|f| !f.is_empty()),
        columns: columns.filter(|c| !c.is_empty()),
    };

    for attempt in 1..=MAX_UPDATE_ATTEMPTS {
        let (mut registry, generation) = fetch_registry(store).await?;
        registry.insert(dataset_name.to_string(), entry.clone());

        let bytes = serde_json::to_vec(&registry)?;
        match store
            .put(REGISTRY_PATH, bytes, WritePrecondition::IfGenerationMatch(generation))
            .await
        {
            Ok(_) => {
                debug!(dataset = %dataset_name, generation, "registry entry written");
                return Ok(());
            }
            Err(StoreError::Conflict(_)) if attempt < MAX_UPDATE_ATTEMPTS => {
                warn!(dataset = %dataset_name, attempt, "registry write conflict, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(TrainingError::Registry(format!(
        "registry update for '{dataset_name}' lost {MAX_UPDATE_ATTEMPTS} write races"
    )))
}

/// Fetches the registry document and the generation it was read at.
/// Absent document -> empty registry at generation 0.
pub async fn fetch_registry(
    store: &dyn ObjectStore,
) -> TrainingResult<(DatasetRegistry, i64)> {
    match store.get(REGISTRY_PATH).await {
        Ok(obj) => {
            let registry: DatasetRegistry = serde_json::from_slice(&obj.bytes)?;
            Ok((registry, obj.generation))
        }
        Err(StoreError::NotFound(_)) => {
            debug!("registry document absent, starting from empty mapping");
            Ok((DatasetRegistry::new(), 0))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kiln_abstraction::{FetchedObject, StoreObject};
    use kiln_platform::MemoryStore;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store whose reads fail with a non-not-found error and which counts
    /// write attempts.
    struct UnreachableStore {
        puts: AtomicU32,
    }

    impl UnreachableStore {
        fn new() -> Self {
            Self { puts: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl ObjectStore for UnreachableStore {
        fn bucket(&self) -> &str {
            "test-bucket"
        }

        async fn put(
            &self,
            path: &str,
            _bytes: Vec<u8>,
            _precondition: WritePrecondition,
        ) -> Result<String, StoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(self.url_for(path))
        }

        async fn get(&self, _path: &str) -> Result<FetchedObject, StoreError> {
            Err(StoreError::Collaborator("connection reset by peer".to_string()))
        }

        async fn list(&self, _prefix: &str) -> Result<Vec<StoreObject>, StoreError> {
            Err(StoreError::Collaborator("connection reset by peer".to_string()))
        }

        async fn exists(&self, _path: &str) -> Result<bool, StoreError> {
            Err(StoreError::Collaborator("connection reset by peer".to_string()))
        }
    }

    /// Store that reads fine but rejects every conditional write, as if a
    /// faster writer always lands in between. Counts write attempts.
    struct ContestedStore {
        puts: AtomicU32,
    }

    impl ContestedStore {
        fn new() -> Self {
            Self { puts: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl ObjectStore for ContestedStore {
        fn bucket(&self) -> &str {
            "test-bucket"
        }

        async fn put(
            &self,
            path: &str,
            _bytes: Vec<u8>,
            _precondition: WritePrecondition,
        ) -> Result<String, StoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Conflict(path.to_string()))
        }

        async fn get(&self, _path: &str) -> Result<FetchedObject, StoreError> {
            Ok(FetchedObject { bytes: b"{}".to_vec(), generation: 1 })
        }

        async fn list(&self, _prefix: &str) -> Result<Vec<StoreObject>, StoreError> {
            Ok(Vec::new())
        }

        async fn exists(&self, _path: &str) -> Result<bool, StoreError> {
            Ok(true)
        }
    }

    #[test]
    fn test_dataset_name_strips_final_extension() {
        assert_eq!(dataset_name_for_file("foo.csv"), "foo");
        assert_eq!(dataset_name_for_file("data.v2.jsonl"), "data.v2");
        assert_eq!(dataset_name_for_file("noext"), "noext");
        assert_eq!(dataset_name_for_file(".hidden"), ".hidden");
    }

    #[tokio::test]
    async fn test_first_upload_creates_minimal_entry() {
        let store = MemoryStore::new("test-bucket");
        update_registry(&store, "foo", "foo.csv", None, None).await.unwrap();

        let obj = store.get(REGISTRY_PATH).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&obj.bytes).unwrap();
        assert_eq!(json, serde_json::json!({"foo": {"file_name": "foo.csv"}}));
    }

    #[tokio::test]
    async fn test_reupload_overwrites_entry_and_preserves_others() {
        let store = MemoryStore::new("test-bucket");
        update_registry(&store, "foo", "foo.csv", None, None).await.unwrap();
        update_registry(&store, "bar", "bar.jsonl", None, None).await.unwrap();
        update_registry(&store, "foo", "foo.csv", Some("alpaca".to_string()), None)
            .await
            .unwrap();

        let (registry, _) = fetch_registry(&store).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry["foo"].formatting.as_deref(), Some("alpaca"));
        assert_eq!(registry["bar"].file_name, "bar.jsonl");
    }

    #[tokio::test]
    async fn test_empty_optional_fields_are_dropped() {
        let store = MemoryStore::new("test-bucket");
        update_registry(&store, "foo", "foo.csv", Some(String::new()), Some(BTreeMap::new()))
            .await
            .unwrap();

        let obj = store.get(REGISTRY_PATH).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&obj.bytes).unwrap();
        assert_eq!(json, serde_json::json!({"foo": {"file_name": "foo.csv"}}));
    }

    #[tokio::test]
    async fn test_columns_round_trip() {
        let store = MemoryStore::new("test-bucket");
        let columns: BTreeMap<String, String> =
            [("prompt".to_string(), "instruction".to_string())].into_iter().collect();
        update_registry(&store, "foo", "foo.csv", None, Some(columns.clone())).await.unwrap();

        let (registry, _) = fetch_registry(&store).await.unwrap();
        assert_eq!(registry["foo"].columns.as_ref(), Some(&columns));
    }

    #[tokio::test]
    async fn test_stale_generation_write_conflicts() {
        let store = MemoryStore::new("test-bucket");
        store
            .put(REGISTRY_PATH, b"{}".to_vec(), WritePrecondition::None)
            .await
            .unwrap();

        // A writer holding generation 0 must lose against the existing object.
        let err = store
            .put(REGISTRY_PATH, b"{}".to_vec(), WritePrecondition::IfGenerationMatch(0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // The updater re-reads and succeeds anyway.
        update_registry(&store, "foo", "foo.csv", None, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces_and_blocks_write() {
        let store = UnreachableStore::new();

        let err = update_registry(&store, "foo", "foo.csv", None, None).await.unwrap_err();
        assert!(matches!(err, TrainingError::Store(StoreError::Collaborator(_))));

        // The failed read must never be treated as an empty registry and
        // written back, which would truncate every existing entry.
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_gives_up_after_repeated_write_conflicts() {
        let store = ContestedStore::new();

        let err = update_registry(&store, "foo", "foo.csv", None, None).await.unwrap_err();
        assert!(matches!(err, TrainingError::Registry(_)));
        assert_eq!(store.puts.load(Ordering::SeqCst), MAX_UPDATE_ATTEMPTS);
    }
}
