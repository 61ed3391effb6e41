//! Pipeline manifest loaded from YAML

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Manifest file used when none is given on the command line
pub const DEFAULT_MANIFEST: &str = "pipeline.yaml";

/// Top-level manifest: the tasks to run and the volumes they may mount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
    /// Tasks in execution order
    #[serde(default)]
    pub tasks: Vec<Task>,

    /// Named host directories available to tasks
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

/// One containerized unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    /// Image reference, e.g. `alpine` or `rust:1.80`
    pub image: String,

    /// Command to run; empty runs the image's default command
    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default)]
    pub volume_mounts: Vec<VolumeMount>,
}

/// A named host directory, relative to the working directory at run time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Volume {
    pub name: String,
    pub host_path: String,
}

/// A task's reference to a volume and where to mount it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeMount {
    /// Must match a [`Volume::name`]; checked when the task runs
    pub name: String,

    /// Absolute path inside the container
    pub container_path: String,
}

impl Manifest {
    /// Load a manifest from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|cause| ConfigError::Read {
            path: path.to_path_buf(),
            cause,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a manifest from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(ConfigError::Parse)
    }
}
