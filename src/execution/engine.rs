//! Main execution engine - runs a pipeline's tasks in order

use crate::{
    client::EngineClient,
    core::{ExecutionStatus, Pipeline, PipelineReport, TaskStage},
    error::PipelineError,
    execution::{TaskExecutor, VolumeResolver},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        total_tasks: usize,
    },
    TaskStarted {
        index: usize,
        image: String,
    },
    PullProgress {
        index: usize,
        line: String,
    },
    ContainerCreated {
        index: usize,
        container_id: String,
    },
    TaskCompleted {
        index: usize,
        exit_code: i64,
    },
    RemovalFailed {
        index: usize,
        container_id: String,
        error: String,
    },
    TaskFailed {
        index: usize,
        stage: TaskStage,
        error: String,
    },
    PipelineCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Main pipeline execution engine
pub struct ExecutionEngine<E> {
    executor: TaskExecutor<E>,
    event_handlers: Vec<EventHandler>,

    /// Base for volume host paths; the process cwd when unset
    working_dir: Option<PathBuf>,
}

impl<E: EngineClient> ExecutionEngine<E> {
    pub fn new(client: E) -> Self {
        Self {
            executor: TaskExecutor::new(client),
            event_handlers: Vec::new(),
            working_dir: None,
        }
    }

    /// Resolve volume host paths against `dir` instead of the current directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// The engine client tasks run against
    pub fn client(&self) -> &E {
        self.executor.client()
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute every task in manifest order
    ///
    /// Stops at the first task that fails before its container stops and
    /// returns that error; later tasks are never started. Containers that
    /// could not be removed are reported but do not fail the run.
    ///
    /// `args` holds extra command-line arguments; tasks do not use them.
    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        args: &[String],
    ) -> Result<PipelineReport, PipelineError> {
        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(PipelineError::WorkingDirectory)?,
        };

        let mut report = PipelineReport::new();
        let execution_id = report.execution_id;

        info!(
            "Starting pipeline execution: {} tasks ({})",
            pipeline.len(),
            execution_id
        );
        if !args.is_empty() {
            debug!("Extra arguments: {:?}", args);
        }

        report.start(pipeline.len());
        self.emit_event(ExecutionEvent::PipelineStarted {
            execution_id,
            total_tasks: pipeline.len(),
        });

        let resolver = VolumeResolver::new(pipeline, &working_dir);
        let emit = |event: ExecutionEvent| self.emit_event(event);

        for (i, task) in pipeline.tasks().iter().enumerate() {
            let index = i + 1;
            self.emit_event(ExecutionEvent::TaskStarted {
                index,
                image: task.image.clone(),
            });

            match self.executor.run(index, task, &resolver, &emit).await {
                Ok(task_report) => {
                    self.emit_event(ExecutionEvent::TaskCompleted {
                        index,
                        exit_code: task_report.exit_code,
                    });
                    report.tasks.push(task_report);
                }
                Err(failure) => {
                    error!(
                        "Task {} failed after stage {:?}: {}",
                        index, failure.stage, failure.error
                    );
                    self.emit_event(ExecutionEvent::TaskFailed {
                        index,
                        stage: failure.stage,
                        error: failure.error.to_string(),
                    });
                    self.emit_event(ExecutionEvent::PipelineCompleted {
                        execution_id,
                        status: ExecutionStatus::Failed,
                    });
                    return Err(failure.error);
                }
            }
        }

        report.complete();
        info!(
            "Pipeline execution finished: {} tasks ({})",
            report.tasks.len(),
            execution_id
        );
        self.emit_event(ExecutionEvent::PipelineCompleted {
            execution_id,
            status: ExecutionStatus::Completed,
        });

        Ok(report)
    }
}
