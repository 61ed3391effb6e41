//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Pipeline has not started
    Pending,
    /// Pipeline is currently running
    Running,
    /// Every task ran to completion
    Completed,
    /// A task failed and the pipeline stopped
    Failed,
}

/// Lifecycle stage of a single task's container
///
/// Stages advance strictly in declaration order. A failure before `Waited`
/// is fatal to the pipeline; `Removed` is best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskStage {
    Pending,
    ImagePulled,
    Created,
    Started,
    Waited,
    Removed,
}

/// Result of the final, non-fatal removal step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalOutcome {
    Removed,
    Failed { error: String },
}

impl RemovalOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, RemovalOutcome::Removed)
    }
}

/// Record of a task that ran to a terminal condition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    /// Position in the manifest, starting at 1
    pub index: usize,
    pub image: String,
    pub container_id: String,

    /// Exit code reported by the engine; informational only
    pub exit_code: i64,

    pub removal: RemovalOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TaskReport {
    /// Furthest stage the task reached
    pub fn stage(&self) -> TaskStage {
        if self.removal.is_removed() {
            TaskStage::Removed
        } else {
            TaskStage::Waited
        }
    }
}

/// Record of one pipeline execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub execution_id: Uuid,
    pub status: ExecutionStatus,
    pub total_tasks: usize,

    /// Finished tasks in execution order
    pub tasks: Vec<TaskReport>,

    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PipelineReport {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            total_tasks: 0,
            tasks: Vec::new(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Mark pipeline as started
    pub fn start(&mut self, total_tasks: usize) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
        self.total_tasks = total_tasks;
    }

    /// Mark pipeline as completed
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Tasks whose container could not be removed
    pub fn leaked_containers(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|t| !t.removal.is_removed())
            .map(|t| t.container_id.as_str())
            .collect()
    }

    /// Calculate progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_tasks == 0 {
            return 0.0;
        }
        self.tasks.len() as f64 / self.total_tasks as f64
    }
}

impl Default for PipelineReport {
    fn default() -> Self {
        Self::new()
    }
}
