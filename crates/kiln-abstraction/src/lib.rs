//! Collaborator abstraction layer for Kiln.
//!
//! This crate defines the capability traits the control plane consumes:
//! - `ObjectStore`: put/get/list/exists on named blobs in a bucket
//! - `TrainingPlatform`: custom-job submission and raw job state queries
//! - `ServingPlatform`: endpoint creation, model upload/deploy, endpoint
//!   descriptor queries
//!
//! Concrete cloud implementations live in `kiln-platform`; the domain logic in
//! `kiln-training` and the HTTP surface in `kiln-server` only ever see these
//! traits.

pub mod error;
pub mod platform;
pub mod store;

pub use error::{PlatformError, StoreError};
pub use platform::{
    ContainerSpec, CustomJobSpec, DeploySpec, DeployedModel, EndpointDescriptor, EnvVar,
    MachineSpec, ModelUploadSpec, PrivateEndpoints, RawJob, ServingPlatform, TrainingPlatform,
};
pub use store::{FetchedObject, ObjectStore, StoreLocator, StoreObject, WritePrecondition};
