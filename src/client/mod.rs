//! Container engine client used to drive task containers

pub mod config;
pub mod docker_client;
pub mod error;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::path::PathBuf;
use tokio::sync::oneshot;

pub use config::EngineClientConfig;
pub use docker_client::DockerClient;
pub use error::EngineError;

/// Progress output of an image pull, one record per item
///
/// The stream owns the underlying connection; dropping it releases the pull.
pub type PullProgress = BoxStream<'static, Result<String, EngineError>>;

/// A host directory bind-mounted into a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    /// Absolute path on the host
    pub host_path: PathBuf,
    /// Absolute path inside the container
    pub container_path: String,
}

/// Everything needed to create a task container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    /// Empty means the image's default command
    pub command: Vec<String>,
    pub mounts: Vec<BindMount>,
}

/// Pending result of waiting on a container
///
/// Exactly one of the two channels resolves with a value: `exited` once the
/// container is no longer running (carrying its exit code), or `failed`
/// when the engine reports a wait error.
#[derive(Debug)]
pub struct ContainerWait {
    pub exited: oneshot::Receiver<i64>,
    pub failed: oneshot::Receiver<EngineError>,
}

/// Sending half of a [`ContainerWait`]
#[derive(Debug)]
pub struct WaitSignal {
    exited: oneshot::Sender<i64>,
    failed: oneshot::Sender<EngineError>,
}

impl ContainerWait {
    pub fn channel() -> (WaitSignal, ContainerWait) {
        let (exited_tx, exited_rx) = oneshot::channel();
        let (failed_tx, failed_rx) = oneshot::channel();
        (
            WaitSignal {
                exited: exited_tx,
                failed: failed_tx,
            },
            ContainerWait {
                exited: exited_rx,
                failed: failed_rx,
            },
        )
    }
}

impl WaitSignal {
    /// Signal that the container reached a non-running condition
    pub fn exited(self, exit_code: i64) {
        let _ = self.exited.send(exit_code);
    }

    /// Signal that waiting on the container failed
    pub fn failed(self, error: EngineError) {
        let _ = self.failed.send(error);
    }
}

/// Operations the pipeline needs from a container engine
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Pull an image by reference, returning its progress output
    async fn pull_image(&self, image: &str) -> Result<PullProgress, EngineError>;

    /// Create a container and return its identifier
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError>;

    /// Start a created container
    async fn start_container(&self, id: &str) -> Result<(), EngineError>;

    /// Begin waiting for a container to leave the running condition
    fn wait_container(&self, id: &str) -> ContainerWait;

    /// Remove a container
    async fn remove_container(&self, id: &str) -> Result<(), EngineError>;
}
