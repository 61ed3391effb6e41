//! Test: Failure policy - fatal steps abort the pipeline, removal does not

use crate::helpers::*;
use docker_pipeline::core::{RemovalOutcome, TaskStage};
use docker_pipeline::error::LifecycleStep;
use docker_pipeline::execution::ExecutionEvent;

const TWO_TASKS: &str = r#"
Tasks:
  - Image: alpine
    Command: ["echo", "one"]
  - Image: busybox
    Command: ["echo", "two"]
"#;

/// Create failure on task 1 aborts before task 2 is pulled
#[tokio::test]
async fn test_create_failure_stops_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml(TWO_TASKS);
    let engine = MockEngine::new().fail_on(LifecycleStep::Create, 1);

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    assert_failed_at(&run, 1, LifecycleStep::Create);
    assert!(run.error().to_string().contains("failed to create container"));
    assert_eq!(engine.pulls(), vec!["alpine"]);
    assert_eq!(engine.count(|c| matches!(c, EngineCall::Start(_))), 0);
}

/// Pull failure stops before any container exists
#[tokio::test]
async fn test_pull_failure_stops_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml(TWO_TASKS);
    let engine = MockEngine::new().fail_on(LifecycleStep::Pull, 1);

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    assert_failed_at(&run, 1, LifecycleStep::Pull);
    assert!(run.error().to_string().contains("pull access denied for alpine"));
    assert_eq!(engine.calls(), vec![EngineCall::Pull("alpine".to_string())]);
}

/// Error records in pull output are progress, not a failed pull
#[tokio::test]
async fn test_pull_error_record_does_not_stop_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml(TWO_TASKS);
    let engine = MockEngine::new().with_pull_error_record("net/http: TLS handshake timeout");

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    assert_eq!(run.report().tasks.len(), 2);
    assert_eq!(engine.count(|c| matches!(c, EngineCall::Remove(_))), 2);
    assert!(run.events.iter().any(|e| matches!(
        e,
        ExecutionEvent::PullProgress { index: 1, line } if line.contains("TLS handshake timeout")
    )));
}

/// Start failure on the second task keeps the first task's work
#[tokio::test]
async fn test_start_failure_on_second_task() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml(TWO_TASKS);
    let engine = MockEngine::new().fail_on(LifecycleStep::Start, 2);

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    assert_failed_at(&run, 2, LifecycleStep::Start);
    // Task 1 was removed before task 2 began
    assert!(
        engine.position(&EngineCall::Remove("container-1".to_string()))
            < engine.position(&EngineCall::Pull("busybox".to_string()))
    );
    assert_eq!(engine.count(|c| matches!(c, EngineCall::Wait(_))), 1);
}

/// Wait error is fatal and the container is not removed
#[tokio::test]
async fn test_wait_failure_stops_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml(TWO_TASKS);
    let engine = MockEngine::new().fail_on(LifecycleStep::Wait, 1);

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    assert_failed_at(&run, 1, LifecycleStep::Wait);
    assert!(run.error().to_string().contains("connection reset while waiting"));
    assert_eq!(engine.count(|c| matches!(c, EngineCall::Remove(_))), 0);
    assert_eq!(engine.pulls(), vec!["alpine"]);

    let failed_stage = run.events.iter().find_map(|e| match e {
        ExecutionEvent::TaskFailed { index, stage, .. } => Some((*index, *stage)),
        _ => None,
    });
    assert_eq!(failed_stage, Some((1, TaskStage::Started)));
}

/// Removal failure is logged and the next task still runs
#[tokio::test]
async fn test_removal_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml(TWO_TASKS);
    let engine = MockEngine::new().fail_on(LifecycleStep::Remove, 1);

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;
    let report = run.report();

    assert_eq!(report.tasks.len(), 2);
    assert!(matches!(report.tasks[0].removal, RemovalOutcome::Failed { .. }));
    assert_eq!(report.tasks[1].removal, RemovalOutcome::Removed);
    assert_eq!(report.leaked_containers(), vec!["container-1"]);

    assert!(run.events.iter().any(|e| matches!(
        e,
        ExecutionEvent::RemovalFailed { index: 1, .. }
    )));
}

/// Removal failing for every task still succeeds overall
#[tokio::test]
async fn test_all_removals_fail() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml(TWO_TASKS);
    let engine = MockEngine::new()
        .fail_on(LifecycleStep::Remove, 1)
        .fail_on(LifecycleStep::Remove, 2);

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    assert_eq!(run.report().leaked_containers().len(), 2);
}

/// The last events of a failed run name the failing task
#[tokio::test]
async fn test_failure_events() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml(TWO_TASKS);
    let engine = MockEngine::new().fail_on(LifecycleStep::Create, 2);

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    let n = run.events.len();
    assert!(matches!(
        run.events[n - 2],
        ExecutionEvent::TaskFailed {
            index: 2,
            stage: TaskStage::ImagePulled,
            ..
        }
    ));
    assert!(matches!(
        run.events[n - 1],
        ExecutionEvent::PipelineCompleted { .. }
    ));
    assert!(!run
        .events
        .iter()
        .any(|e| matches!(e, ExecutionEvent::TaskCompleted { index: 2, .. })));
}
