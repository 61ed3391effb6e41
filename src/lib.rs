//! docker-pipeline - run a declarative sequence of containerized tasks

pub mod cli;
pub mod client;
pub mod core;
pub mod error;
pub mod execution;

// Re-export commonly used types
pub use crate::client::{BindMount, ContainerSpec, ContainerWait, EngineClient, EngineError, PullProgress};
pub use crate::client::{DockerClient, EngineClientConfig};
pub use crate::core::{Manifest, Pipeline, PipelineReport, Task, TaskStage, Volume, VolumeMount};
pub use error::{ConfigError, LifecycleStep, PipelineError};
pub use execution::{ExecutionEngine, ExecutionEvent};
