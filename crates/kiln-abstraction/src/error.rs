//! Error types for collaborator capabilities.

use thiserror::Error;

/// Errors surfaced by an object store collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced object does not exist in the bucket.
    #[error("object not found: {0}")]
    NotFound(String),

    /// A store locator does not match the expected `gs://<bucket>/<object>`
    /// shape for the configured bucket.
    #[error("invalid store locator: {0}")]
    InvalidReference(String),

    /// A conditional write lost its generation precondition.
    #[error("write conflict on {0}")]
    Conflict(String),

    /// Any other store failure, transient or permanent. Carries only the
    /// original message text.
    #[error("store failure: {0}")]
    Collaborator(String),
}

/// Errors surfaced by the training/serving platform collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The referenced job, model, or endpoint does not exist.
    #[error("platform resource not found: {0}")]
    NotFound(String),

    /// Any other platform failure. Not distinguished further.
    #[error("platform failure: {0}")]
    Collaborator(String),
}
