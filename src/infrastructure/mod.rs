//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! domain logic: configuration, adapter wiring and the pipeline lifecycle.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`pipeline`] - Task spawning, status and stop

pub mod bootstrap;
pub mod config;
pub mod pipeline;

pub use pipeline::{Pipeline, PipelineHandle, PipelineStatus};
