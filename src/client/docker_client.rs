//! Docker engine client - talks to the local Docker daemon through bollard

use crate::client::{
    ContainerSpec, ContainerWait, EngineClient, EngineClientConfig, EngineError, PullProgress,
};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions,
    WaitContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::image::CreateImageOptions;
use bollard::models::{ContainerWaitResponse, CreateImageInfo, HostConfig, Mount, MountTypeEnum};
use bollard::{Docker, API_DEFAULT_VERSION};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const PROGRESS_BUFFER: usize = 32;

/// Client for a Docker-compatible engine
#[derive(Debug, Clone)]
pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    /// Connect to the engine
    ///
    /// Without an explicit endpoint the connection comes from the local
    /// environment: `DOCKER_HOST` if set, otherwise the platform default socket.
    pub fn new(config: &EngineClientConfig) -> Result<Self, EngineError> {
        let docker = match config.endpoint.as_deref() {
            None => Docker::connect_with_local_defaults(),
            Some(endpoint) if endpoint.starts_with("tcp://") || endpoint.starts_with("http://") => {
                Docker::connect_with_http(endpoint, config.timeout_secs, API_DEFAULT_VERSION)
            }
            Some(endpoint) => connect_with_socket(endpoint, config.timeout_secs),
        }
        .map_err(|e| EngineError::Connection(e.to_string()))?;

        debug!("Docker client created (endpoint: {:?})", config.endpoint);

        Ok(Self { docker })
    }
}

#[cfg(unix)]
fn connect_with_socket(endpoint: &str, timeout_secs: u64) -> Result<Docker, bollard::errors::Error> {
    Docker::connect_with_unix(endpoint, timeout_secs, API_DEFAULT_VERSION)
}

#[cfg(windows)]
fn connect_with_socket(endpoint: &str, timeout_secs: u64) -> Result<Docker, bollard::errors::Error> {
    Docker::connect_with_named_pipe(endpoint, timeout_secs, API_DEFAULT_VERSION)
}

/// Split an image reference into the `fromImage` and `tag` pull parameters
///
/// An untagged reference pulls `latest` rather than every tag of the repository.
fn split_image_reference(image: &str) -> (&str, &str) {
    if let Some((name, digest)) = image.split_once('@') {
        return (name, digest);
    }

    let name_start = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[name_start..].rfind(':') {
        Some(i) => (&image[..name_start + i], &image[name_start + i + 1..]),
        None => (image, "latest"),
    }
}

/// Turn one item of the pull stream into a progress record
///
/// An error record from the registry is still progress output; only a failed
/// request or transport is an error.
fn pull_record(item: Result<CreateImageInfo, BollardError>) -> Result<String, EngineError> {
    match item {
        Ok(info) => serde_json::to_string(&info).map_err(|e| EngineError::Api(e.to_string())),
        Err(BollardError::DockerStreamError { error }) => {
            warn!("Pull reported an error: {}", error);
            Ok(serde_json::json!({ "error": error }).to_string())
        }
        Err(e) => Err(e.into()),
    }
}

/// Exit code of a stopped container, from the first wait response
fn wait_outcome(
    item: Option<Result<ContainerWaitResponse, BollardError>>,
) -> Result<i64, EngineError> {
    match item {
        Some(Ok(response)) => Ok(response.status_code),
        // bollard reports a non-zero exit as an error; the container still stopped
        Some(Err(BollardError::DockerContainerWaitError { code, .. })) => Ok(code),
        Some(Err(e)) => Err(e.into()),
        None => Err(EngineError::WaitAborted),
    }
}

#[async_trait]
impl EngineClient for DockerClient {
    async fn pull_image(&self, image: &str) -> Result<PullProgress, EngineError> {
        let (from_image, tag) = split_image_reference(image);
        debug!("Pulling image {}:{}", from_image, tag);

        let from_image = from_image.to_string();
        let tag = tag.to_string();
        let docker = self.docker.clone();
        let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);

        tokio::spawn(async move {
            let options = CreateImageOptions {
                from_image,
                tag,
                ..Default::default()
            };
            let mut stream = Box::pin(docker.create_image(Some(options), None, None));

            while let Some(item) = stream.next().await {
                let record = pull_record(item);
                let failed = record.is_err();
                // Receiver gone: the consumer dropped the progress stream
                if tx.send(record).await.is_err() || failed {
                    break;
                }
            }
        });

        let progress = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|record| (record, rx))
        });
        Ok(progress.boxed())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        let mounts = spec
            .mounts
            .iter()
            .map(|m| Mount {
                target: Some(m.container_path.clone()),
                source: Some(m.host_path.to_string_lossy().into_owned()),
                typ: Some(MountTypeEnum::BIND),
                ..Default::default()
            })
            .collect();

        let config = Config {
            image: Some(spec.image.clone()),
            cmd: if spec.command.is_empty() {
                None
            } else {
                Some(spec.command.clone())
            },
            host_config: Some(HostConfig {
                mounts: Some(mounts),
                ..Default::default()
            }),
            ..Default::default()
        };

        let response = self
            .docker
            .create_container(None::<CreateContainerOptions<String>>, config)
            .await?;

        for warning in &response.warnings {
            warn!("Engine warning for container {}: {}", response.id, warning);
        }

        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    fn wait_container(&self, id: &str) -> ContainerWait {
        let (signal, wait) = ContainerWait::channel();
        let docker = self.docker.clone();
        let id = id.to_string();

        tokio::spawn(async move {
            let options = WaitContainerOptions {
                condition: "not-running",
            };
            let mut stream = Box::pin(docker.wait_container(&id, Some(options)));

            match wait_outcome(stream.next().await) {
                Ok(code) => signal.exited(code),
                Err(e) => signal.failed(e),
            }
        });

        wait
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker
            .remove_container(id, None::<RemoveContainerOptions>)
            .await?;
        Ok(())
    }
}
