//! Pipeline domain model

use crate::core::manifest::{Manifest, Task, Volume};
use crate::error::ConfigError;
use std::collections::HashMap;

/// A pipeline built once from a manifest and read-only afterwards
#[derive(Debug, Clone)]
pub struct Pipeline {
    tasks: Vec<Task>,
    volumes: Vec<Volume>,

    /// Volume name -> index into `volumes`
    volume_index: HashMap<String, usize>,
}

impl Pipeline {
    /// Create a pipeline from a manifest
    ///
    /// Volume names must be unique. Mount references are not checked here;
    /// an undefined reference fails when its task runs.
    pub fn new(manifest: Manifest) -> Result<Self, ConfigError> {
        let mut volume_index = HashMap::with_capacity(manifest.volumes.len());
        for (i, volume) in manifest.volumes.iter().enumerate() {
            if volume_index.insert(volume.name.clone(), i).is_some() {
                return Err(ConfigError::DuplicateVolume(volume.name.clone()));
            }
        }

        Ok(Pipeline {
            tasks: manifest.tasks,
            volumes: manifest.volumes,
            volume_index,
        })
    }

    /// Tasks in execution order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    /// Look up a volume by name
    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.volume_index.get(name).map(|&i| &self.volumes[i])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
