//! Task executor - drives one task's container through its lifecycle

use crate::{
    client::{ContainerSpec, ContainerWait, EngineClient, EngineError},
    core::{RemovalOutcome, Task, TaskReport, TaskStage},
    error::{LifecycleStep, PipelineError, RemovalError},
    execution::{ExecutionEvent, VolumeResolver},
};
use chrono::Utc;
use futures::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Sink for events raised while a task runs
pub type EventSink<'a> = &'a (dyn Fn(ExecutionEvent) + Sync);

/// A task stopped before reaching a terminal condition
#[derive(Debug, Error)]
#[error("{error}")]
pub struct TaskFailure {
    /// Last stage the task reached before the failure
    pub stage: TaskStage,
    pub error: PipelineError,
}

fn failed_at(stage: TaskStage) -> impl FnOnce(PipelineError) -> TaskFailure {
    move |error| TaskFailure { stage, error }
}

/// Executes a single task
pub struct TaskExecutor<E> {
    client: E,
}

impl<E: EngineClient> TaskExecutor<E> {
    pub fn new(client: E) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &E {
        &self.client
    }

    /// Run a task: pull, create, start, wait, then remove
    ///
    /// Any failure up to and including the wait is returned. A failed
    /// removal is recorded in the report and never returned as an error.
    pub async fn run(
        &self,
        index: usize,
        task: &Task,
        resolver: &VolumeResolver<'_>,
        emit: EventSink<'_>,
    ) -> Result<TaskReport, TaskFailure> {
        let started_at = Utc::now();

        self.pull_image(index, &task.image, emit)
            .await
            .map_err(failed_at(TaskStage::Pending))?;
        debug!("Task {}: image {} pulled", index, task.image);

        let mounts = resolver
            .resolve(&task.volume_mounts)
            .map_err(failed_at(TaskStage::ImagePulled))?;

        let spec = ContainerSpec {
            image: task.image.clone(),
            command: task.command.clone(),
            mounts,
        };

        let container_id = self
            .client
            .create_container(&spec)
            .await
            .map_err(|e| PipelineError::engine(index, LifecycleStep::Create, e))
            .map_err(failed_at(TaskStage::ImagePulled))?;
        debug!("Task {}: created container {}", index, container_id);
        emit(ExecutionEvent::ContainerCreated {
            index,
            container_id: container_id.clone(),
        });

        self.client
            .start_container(&container_id)
            .await
            .map_err(|e| PipelineError::engine(index, LifecycleStep::Start, e))
            .map_err(failed_at(TaskStage::Created))?;
        debug!("Task {}: started container {}", index, container_id);

        let exit_code = self
            .wait_for_completion(index, &container_id)
            .await
            .map_err(failed_at(TaskStage::Started))?;
        info!(
            "Task {}: container {} stopped (exit code {})",
            index, container_id, exit_code
        );

        let removal = self.remove_container(index, &container_id, emit).await;

        Ok(TaskReport {
            index,
            image: task.image.clone(),
            container_id,
            exit_code,
            removal,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Pull an image, draining its progress output
    ///
    /// The progress stream lives only for the duration of this call.
    async fn pull_image(
        &self,
        index: usize,
        image: &str,
        emit: EventSink<'_>,
    ) -> Result<(), PipelineError> {
        info!("Task {}: pulling {}", index, image);

        let mut progress = self
            .client
            .pull_image(image)
            .await
            .map_err(|e| PipelineError::engine(index, LifecycleStep::Pull, e))?;

        while let Some(record) = progress.next().await {
            let line = record.map_err(|e| PipelineError::engine(index, LifecycleStep::Pull, e))?;
            debug!("Task {}: {}", index, line);
            emit(ExecutionEvent::PullProgress { index, line });
        }

        Ok(())
    }

    /// Block until the container stops or the engine reports a wait error
    ///
    /// Whichever signal arrives first decides the outcome; the other is
    /// dropped. The exit code does not affect success.
    pub async fn wait_for_completion(
        &self,
        index: usize,
        container_id: &str,
    ) -> Result<i64, PipelineError> {
        let ContainerWait { exited, failed } = self.client.wait_container(container_id);

        tokio::select! {
            Ok(exit_code) = exited => Ok(exit_code),
            Ok(error) = failed => Err(PipelineError::engine(index, LifecycleStep::Wait, error)),
            else => Err(PipelineError::engine(
                index,
                LifecycleStep::Wait,
                EngineError::WaitAborted,
            )),
        }
    }

    async fn remove_container(
        &self,
        index: usize,
        container_id: &str,
        emit: EventSink<'_>,
    ) -> RemovalOutcome {
        match self.client.remove_container(container_id).await {
            Ok(()) => {
                debug!("Task {}: removed container {}", index, container_id);
                RemovalOutcome::Removed
            }
            Err(cause) => {
                let error = RemovalError {
                    task: index,
                    container_id: container_id.to_string(),
                    cause,
                };
                warn!("{}", error);
                emit(ExecutionEvent::RemovalFailed {
                    index,
                    container_id: container_id.to_string(),
                    error: error.cause.to_string(),
                });
                RemovalOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }
}
