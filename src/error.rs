//! Error taxonomy for manifest loading and pipeline execution
//!
//! Messages carry their cause inline, so a chain of these reads as one line.

use crate::client::EngineError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Manifest could not be loaded or turned into a pipeline
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read manifest file {}: {cause}", path.display())]
    Read { path: PathBuf, cause: std::io::Error },

    #[error("failed to parse manifest: {0}")]
    Parse(serde_yaml::Error),

    #[error("volume '{0}' is defined more than once")]
    DuplicateVolume(String),
}

/// A step of the per-task container lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    Pull,
    Create,
    Start,
    Wait,
    Remove,
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleStep::Pull => "pull image",
            LifecycleStep::Create => "create container",
            LifecycleStep::Start => "start container",
            LifecycleStep::Wait => "wait for container",
            LifecycleStep::Remove => "remove container",
        };
        f.write_str(name)
    }
}

/// Fatal pipeline error; aborts the owning task and everything after it
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to get working directory: {0}")]
    WorkingDirectory(std::io::Error),

    #[error("failed to find volume: {name}")]
    VolumeResolution { name: String },

    #[error("failed to create volume {name} at {}: {cause}", path.display())]
    VolumeCreation {
        name: String,
        path: PathBuf,
        cause: std::io::Error,
    },

    #[error("task {task}: failed to {step}: {cause}")]
    Engine {
        task: usize,
        step: LifecycleStep,
        cause: EngineError,
    },
}

impl PipelineError {
    pub(crate) fn engine(task: usize, step: LifecycleStep, cause: EngineError) -> Self {
        PipelineError::Engine { task, step, cause }
    }

    /// The lifecycle step that failed, for engine errors
    pub fn step(&self) -> Option<LifecycleStep> {
        match self {
            PipelineError::Engine { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Container removal failed after the task finished. Never fatal.
#[derive(Debug, Error)]
#[error("task {task}: failed to {} {container_id}: {cause}", LifecycleStep::Remove)]
pub struct RemovalError {
    pub task: usize,
    pub container_id: String,
    pub cause: EngineError,
}
