//! Core domain models
//!
//! This module defines the manifest, the pipeline built from it, and the
//! records produced while it runs.

pub mod manifest;
pub mod pipeline;
pub mod state;

pub use manifest::*;
pub use pipeline::*;
pub use state::*;
