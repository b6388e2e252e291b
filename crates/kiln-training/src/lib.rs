//! Kiln Training
//!
//! Domain core for the fine-tuning control plane:
//! - Dataset registry document + compare-and-swap updater (`registry`)
//! - Job/endpoint status normalization (`status`)
//! - Training configuration materializer (`config`)
//!
//! Everything here talks to the outside world only through the capability
//! traits in `kiln-abstraction`.

pub mod config;
pub mod error;
pub mod registry;
pub mod status;

pub use config::{config_object_path, materialize_training_config, TrainingParams};
pub use error::{TrainingError, TrainingResult};
pub use registry::{
    dataset_name_for_file, fetch_registry, update_registry, DatasetEntry, DatasetRegistry,
    REGISTRY_PATH,
};
pub use status::{
    normalize_deployment_status, normalize_job_status, DeploymentStatus, TrainingJobStatus,
};
