//! HTTP route modules.

pub mod datasets;
pub mod deployment;
pub mod training;
