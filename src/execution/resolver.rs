//! Volume resolver - turns a task's volume mounts into bind mounts

use crate::client::BindMount;
use crate::core::{Pipeline, VolumeMount};
use crate::error::PipelineError;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolves mount references against a pipeline's volumes
#[derive(Debug, Clone, Copy)]
pub struct VolumeResolver<'a> {
    pipeline: &'a Pipeline,
    working_dir: &'a Path,
}

impl<'a> VolumeResolver<'a> {
    pub fn new(pipeline: &'a Pipeline, working_dir: &'a Path) -> Self {
        Self {
            pipeline,
            working_dir,
        }
    }

    /// Resolve mounts in order, creating each host directory if missing
    ///
    /// Stops at the first mount naming an undefined volume.
    pub fn resolve(&self, mounts: &[VolumeMount]) -> Result<Vec<BindMount>, PipelineError> {
        mounts.iter().map(|mount| self.resolve_one(mount)).collect()
    }

    fn resolve_one(&self, mount: &VolumeMount) -> Result<BindMount, PipelineError> {
        let volume = self
            .pipeline
            .volume(&mount.name)
            .ok_or_else(|| PipelineError::VolumeResolution {
                name: mount.name.clone(),
            })?;

        let host_path = join_lexically(self.working_dir, &volume.host_path);
        std::fs::create_dir_all(&host_path).map_err(|cause| PipelineError::VolumeCreation {
            name: volume.name.clone(),
            path: host_path.clone(),
            cause,
        })?;

        debug!(
            "Volume {} -> {} (container: {})",
            volume.name,
            host_path.display(),
            mount.container_path
        );

        Ok(BindMount {
            host_path,
            container_path: mount.container_path.clone(),
        })
    }
}

/// Join `relative` under `base` and clean the result
///
/// `relative` is always taken as relative to `base`, even with a leading `/`,
/// and `..` never climbs above the root.
fn join_lexically(base: &Path, relative: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::ParentDir => {
                path.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    path
}
