//! CLI output formatting

use crate::core::{ExecutionStatus, PipelineReport, TaskStage};
use crate::execution::ExecutionEvent;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner for an image pull
pub fn create_pull_spinner(image: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {prefix} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_prefix(image.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a task stage for display
pub fn format_stage(stage: TaskStage) -> String {
    match stage {
        TaskStage::Pending => style("PENDING").dim().to_string(),
        TaskStage::ImagePulled => style("PULLED").yellow().to_string(),
        TaskStage::Created => style("CREATED").yellow().to_string(),
        TaskStage::Started => style("STARTED").yellow().to_string(),
        TaskStage::Waited => style("STOPPED").green().to_string(),
        TaskStage::Removed => style("REMOVED").green().to_string(),
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Render one JSON pull-progress record as `status [id] [progress]`
pub fn format_pull_progress(line: &str) -> String {
    let Ok(record) = serde_json::from_str::<serde_json::Value>(line) else {
        return line.to_string();
    };

    ["id", "status", "progress", "error"]
        .iter()
        .filter_map(|key| record.get(*key).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format an execution event for display
///
/// Pull progress is rendered by the spinner instead and yields `None`.
pub fn format_execution_event(event: &ExecutionEvent) -> Option<String> {
    let line = match event {
        ExecutionEvent::PipelineStarted {
            execution_id,
            total_tasks,
        } => format!(
            "{} Starting pipeline with {} tasks ({})",
            ROCKET,
            style(total_tasks).bold(),
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::TaskStarted { index, image } => {
            format!("{} Task {}: {}", SPINNER, index, style(image).cyan())
        }
        ExecutionEvent::PullProgress { .. } => return None,
        ExecutionEvent::ContainerCreated {
            index,
            container_id,
        } => format!(
            "{} Task {}: container {}",
            INFO,
            index,
            style(short_id(container_id)).dim()
        ),
        ExecutionEvent::TaskCompleted { index, exit_code } => format!(
            "{} Task {} {} (exit code {})",
            CHECK,
            index,
            style("finished").green(),
            exit_code
        ),
        ExecutionEvent::RemovalFailed {
            index,
            container_id,
            error,
        } => format!(
            "{} Task {}: could not remove container {}: {}",
            WARN,
            index,
            style(short_id(container_id)).yellow(),
            style(error).dim()
        ),
        ExecutionEvent::TaskFailed {
            index,
            stage,
            error,
        } => format!(
            "{} Task {} failed after {}: {}",
            CROSS,
            style(index).red(),
            format_stage(*stage),
            style(error).dim()
        ),
        ExecutionEvent::PipelineCompleted {
            execution_id,
            status,
        } => format!(
            "{} Pipeline ({}) {}",
            INFO,
            style(&execution_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    };
    Some(line)
}

/// Format a finished run for display
pub fn format_report(report: &PipelineReport) -> String {
    let mut out = format!(
        "{} {} tasks {}",
        CHECK,
        report.tasks.len(),
        format_status(report.status)
    );
    let leaked = report.leaked_containers();
    if !leaked.is_empty() {
        out.push_str(&format!(
            "\n{} {} container(s) left behind: {}",
            WARN,
            leaked.len(),
            leaked.iter().map(|id| short_id(id)).collect::<Vec<_>>().join(", ")
        ));
    }
    out
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(12)]
}

/// Prints execution events to the terminal
pub struct ConsoleReporter {
    show_progress: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            spinner: Mutex::new(None),
        }
    }

    pub fn handle(&self, event: ExecutionEvent) {
        match &event {
            ExecutionEvent::TaskStarted { image, .. } if self.show_progress => {
                self.print(&event);
                self.replace_spinner(Some(create_pull_spinner(image)));
                return;
            }
            ExecutionEvent::PullProgress { line, .. } => {
                if let Ok(guard) = self.spinner.lock() {
                    if let Some(spinner) = guard.as_ref() {
                        spinner.set_message(format_pull_progress(line));
                    }
                }
                return;
            }
            _ => self.replace_spinner(None),
        }
        self.print(&event);
    }

    fn print(&self, event: &ExecutionEvent) {
        if let Some(line) = format_execution_event(event) {
            println!("{}", line);
        }
    }

    fn replace_spinner(&self, next: Option<ProgressBar>) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(previous) = guard.take() {
                previous.finish_and_clear();
            }
            *guard = next;
        }
    }
}
