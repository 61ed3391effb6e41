//! Test: Success - tasks run through the full container lifecycle

use crate::helpers::*;
use docker_pipeline::client::{BindMount, ContainerSpec};
use docker_pipeline::core::{ExecutionStatus, Manifest, Pipeline, TaskStage};
use docker_pipeline::execution::ExecutionEvent;

/// The single-task example: one volume, one mount, echo hi
#[tokio::test]
async fn test_single_task_with_volume() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
Volumes:
  - Name: data
    HostPath: ./data
Tasks:
  - Image: alpine
    Command: ["echo", "hi"]
    VolumeMounts:
      - Name: data
        ContainerPath: /data
"#;

    let pipeline = pipeline_from_yaml(yaml);
    let engine = MockEngine::new();

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;
    let report = run.report();

    assert!(dir.path().join("data").is_dir());
    assert_eq!(
        engine.calls(),
        vec![
            EngineCall::Pull("alpine".to_string()),
            EngineCall::Create(ContainerSpec {
                image: "alpine".to_string(),
                command: vec!["echo".to_string(), "hi".to_string()],
                mounts: vec![BindMount {
                    host_path: dir.path().join("data"),
                    container_path: "/data".to_string(),
                }],
            }),
            EngineCall::Start("container-1".to_string()),
            EngineCall::Wait("container-1".to_string()),
            EngineCall::WaitResolved("container-1".to_string()),
            EngineCall::Remove("container-1".to_string()),
        ]
    );

    assert_eq!(report.status, ExecutionStatus::Completed);
    assert_eq!(report.tasks.len(), 1);
    assert_eq!(report.tasks[0].stage(), TaskStage::Removed);
    assert!(report.leaked_containers().is_empty());
}

/// Multiple tasks run in manifest order, each in its own container
#[tokio::test]
async fn test_tasks_run_in_manifest_order() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
Tasks:
  - Image: rust:1.80
    Command: ["cargo", "build"]
  - Image: alpine
    Command: ["ls"]
  - Image: busybox
"#;

    let pipeline = pipeline_from_yaml(yaml);
    let engine = MockEngine::new();

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;
    let report = run.report();

    assert_eq!(engine.pulls(), vec!["rust:1.80", "alpine", "busybox"]);
    let ids: Vec<_> = report.tasks.iter().map(|t| t.container_id.as_str()).collect();
    assert_eq!(ids, vec!["container-1", "container-2", "container-3"]);
    assert_eq!(engine.count(|c| matches!(c, EngineCall::Remove(_))), 3);

    // Empty command leaves the image default in place
    assert!(engine.created()[2].command.is_empty());
}

/// A non-zero exit code still counts as the task reaching its terminal condition
#[tokio::test]
async fn test_exit_code_does_not_fail_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
Tasks:
  - Image: alpine
    Command: ["false"]
  - Image: alpine
    Command: ["true"]
"#;

    let pipeline = pipeline_from_yaml(yaml);
    let engine = MockEngine::new().with_exit_code(1);

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    let report = run.report();
    assert_eq!(report.tasks.len(), 2);
    assert!(report.tasks.iter().all(|t| t.exit_code == 1));
}

/// An empty manifest runs nothing and succeeds
#[tokio::test]
async fn test_empty_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(Manifest::default()).unwrap();
    let engine = MockEngine::new();

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    assert_eq!(run.report().status, ExecutionStatus::Completed);
    assert!(engine.calls().is_empty());
}

/// Extra arguments are accepted and do not change what runs
#[tokio::test]
async fn test_extra_args_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml("Tasks:\n  - Image: alpine\n");
    let engine = MockEngine::new();
    let args = vec!["--release".to_string(), "target".to_string()];

    let run = run_pipeline_with_args(&engine, &pipeline, dir.path(), &args).await;

    assert_eq!(run.report().tasks.len(), 1);
    assert_eq!(engine.pulls(), vec!["alpine"]);
}

/// Events arrive in lifecycle order, including pull progress
#[tokio::test]
async fn test_events_follow_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_from_yaml("Tasks:\n  - Image: alpine\n");
    let engine = MockEngine::new();

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    let kinds: Vec<&str> = run
        .events
        .iter()
        .map(|e| match e {
            ExecutionEvent::PipelineStarted { .. } => "pipeline_started",
            ExecutionEvent::TaskStarted { .. } => "task_started",
            ExecutionEvent::PullProgress { .. } => "pull_progress",
            ExecutionEvent::ContainerCreated { .. } => "container_created",
            ExecutionEvent::TaskCompleted { .. } => "task_completed",
            ExecutionEvent::RemovalFailed { .. } => "removal_failed",
            ExecutionEvent::TaskFailed { .. } => "task_failed",
            ExecutionEvent::PipelineCompleted { .. } => "pipeline_completed",
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            "pipeline_started",
            "task_started",
            "pull_progress",
            "pull_progress",
            "container_created",
            "task_completed",
            "pipeline_completed",
        ]
    );
}

/// Manifest loaded from disk runs the same as one parsed in memory
#[tokio::test]
async fn test_manifest_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("pipeline.yaml");
    std::fs::write(
        &manifest_path,
        "Volumes:\n  - Name: out\n    HostPath: build/out\nTasks:\n  - Image: alpine\n    VolumeMounts:\n      - Name: out\n        ContainerPath: /out\n",
    )
    .unwrap();

    let pipeline = Pipeline::new(Manifest::from_file(&manifest_path).unwrap()).unwrap();
    let engine = MockEngine::new();

    let run = run_pipeline(&engine, &pipeline, dir.path()).await;

    assert_eq!(run.report().tasks.len(), 1);
    assert!(dir.path().join("build/out").is_dir());
}
