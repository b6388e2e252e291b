//! Kiln Platform
//!
//! Concrete collaborator implementations behind the `kiln-abstraction`
//! capability traits:
//! - `GcsStore`: object store over the Cloud Storage JSON API
//! - `VertexJobs` / `VertexServing`: custom jobs and endpoints over the
//!   Vertex AI REST API
//! - `MemoryStore` and mock platforms for tests and local development
//! - vLLM serving-container materialization for model deployment

pub mod gcs;
pub mod memory;
pub mod mock;
pub mod vertex;
pub mod vllm;

pub use gcs::GcsStore;
pub use memory::MemoryStore;
pub use mock::{MockServing, MockTraining};
pub use vertex::{VertexConfig, VertexJobs, VertexServing};
pub use vllm::{VllmDeployment, VLLM_SERVING_IMAGE_URI};
