// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clinch_core::Backoff;

use super::*;
use crate::{FakeRuntime, RuntimeCall, RuntimeErrorKind, SandboxManager, SandboxOptions};

async fn ready(fake: &FakeRuntime) -> (tempfile::TempDir, SandboxSession) {
    let dir = tempfile::tempdir().unwrap();
    let options = SandboxOptions::new(dir.path())
        .image("alpine:3.20")
        .backoff(Backoff::fixed(Duration::from_millis(1), 3));
    let session = SandboxManager::new(fake.clone()).setup(options).await.unwrap();
    (dir, session)
}

fn exec_options() -> ExecOptions {
    ExecOptions::new(["node", "cli.js"], Duration::from_secs(5))
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn execute_prefixes_program_and_reports_sandbox_mode() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;

    let result = session.execute(&args(&["--help"]), &exec_options()).await.unwrap();

    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.stdout(), "node cli.js --help\n");
    assert_eq!(result.args(), ["--help".to_string()]);
    assert_eq!(result.mode(), ExecMode::Sandbox);
    assert_eq!(result.cwd(), Path::new("/workspace"));
    assert_eq!(session.state(), SessionState::Ready);
    session.teardown().await;
}

#[tokio::test]
async fn execute_passes_through_command_failure() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;
    fake.push_exec(2, "", "usage: cli [options]\n");

    let result = session.execute(&args(&["bad"]), &exec_options()).await.unwrap();

    assert_eq!(result.exit_code(), 2);
    assert_eq!(result.stderr(), "usage: cli [options]\n");
    assert!(!result.timed_out());
    session.teardown().await;
}

#[tokio::test]
async fn runtime_error_during_execute_becomes_exit_125() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;
    fake.fail_next_exec(RuntimeErrorKind::Unreachable, "daemon went away");

    let result = session.execute(&args(&["x"]), &exec_options()).await.unwrap();

    assert_eq!(result.exit_code(), EXIT_RUNTIME_FAILURE);
    assert!(result.stderr().contains("daemon went away"), "stderr: {}", result.stderr());
    assert_eq!(session.state(), SessionState::Ready);
    session.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn slow_exec_times_out_with_exit_124() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;
    fake.set_exec_delay(Duration::from_secs(10));

    let options = ExecOptions::new(["node"], Duration::from_millis(200));
    let result = session.execute(&args(&["hang"]), &options).await.unwrap();

    assert_eq!(result.exit_code(), EXIT_TIMEOUT);
    assert!(result.timed_out());
    assert!(result.stderr().contains("timed out after 200ms"));
    session.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn session_stays_usable_after_a_timeout() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;
    fake.set_exec_delay(Duration::from_secs(10));
    let short = ExecOptions::new(["node"], Duration::from_millis(200));
    let result = session.execute(&args(&["hang"]), &short).await.unwrap();
    assert!(result.timed_out());

    assert_eq!(session.state(), SessionState::Ready);
    assert!(fake.removed().is_empty());
    assert_eq!(fake.containers(), vec![session.container_id().clone()]);

    fake.set_exec_delay(Duration::ZERO);
    let result = session.execute(&args(&["ok"]), &exec_options()).await.unwrap();
    assert_eq!(result.exit_code(), 0);
    session.teardown().await;
}

#[tokio::test]
async fn concurrent_executions_share_the_session() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;
    fake.set_exec_delay(Duration::from_millis(20));

    let options = exec_options();
    let a = args(&["a"]);
    let b = args(&["b"]);
    let (ra, rb) = tokio::join!(session.execute(&a, &options), session.execute(&b, &options));

    assert_eq!(ra.unwrap().stdout(), "node cli.js a\n");
    assert_eq!(rb.unwrap().stdout(), "node cli.js b\n");
    assert_eq!(session.state(), SessionState::Ready);
    session.teardown().await;
}

#[tokio::test]
async fn state_is_executing_while_in_flight() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;
    fake.set_exec_delay(Duration::from_millis(50));

    let a = args(&["a"]);
    let options = exec_options();
    let exec = session.execute(&a, &options);
    let observe = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.state()
    };
    let (result, during) = tokio::join!(exec, observe);

    assert!(result.is_ok());
    assert_eq!(during, SessionState::Executing);
    assert_eq!(session.state(), SessionState::Ready);
    session.teardown().await;
}

#[tokio::test]
async fn closed_session_rejects_execution() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;
    session.teardown().await;

    let err = session.execute(&args(&["x"]), &exec_options()).await.unwrap_err();

    assert!(err.to_string().contains(session.id().as_str()), "message: {}", err);
    match err {
        SandboxError::SessionClosed { id } => assert_eq!(&id, session.id()),
        other => panic!("expected SessionClosed, got {:?}", other),
    }
}

#[tokio::test]
async fn double_teardown_is_a_noop() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;

    session.teardown().await;
    let calls_after_first = fake.calls().len();
    session.teardown().await;

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(fake.calls().len(), calls_after_first);
}

#[tokio::test]
async fn teardown_removes_own_container_and_sweeps() {
    let fake = FakeRuntime::new();
    fake.seed_container("leftover", &["clinch.managed=true"]);
    fake.seed_container("unrelated", &["app=web"]);
    let (_dir, session) = ready(&fake).await;
    let own = session.container_id().clone();

    session.teardown().await;

    let removed = fake.removed();
    assert!(removed.contains(&own));
    assert!(removed.contains(&ContainerId::new("leftover")));
    assert_eq!(fake.containers(), vec![ContainerId::new("unrelated")]);
    assert!(fake.calls().contains(&RuntimeCall::ListLabeled { label: "clinch.managed=true".into() }));
}

#[tokio::test]
async fn teardown_failure_is_logged_not_returned() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;
    fake.fail_next_remove(RuntimeErrorKind::Other, "device busy");

    session.teardown().await;

    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn container_path_translation() {
    let fake = FakeRuntime::new();
    let (dir, session) = ready(&fake).await;
    let root = session.root_binding().to_path_buf();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    assert_eq!(session.container_path(None), "/workspace");
    assert_eq!(session.container_path(Some(&root)), "/workspace");
    assert_eq!(session.container_path(Some(&root.join("sub"))), "/workspace/sub");
    assert_eq!(session.container_path(Some(&dir.path().join("sub"))), "/workspace/sub");
    assert_eq!(session.container_path(Some(Path::new("pkg/a"))), "/workspace/pkg/a");
    assert_eq!(session.container_path(Some(Path::new("/etc"))), "/etc");
    session.teardown().await;
}

#[tokio::test]
async fn execute_uses_translated_cwd() {
    let fake = FakeRuntime::new();
    let (_dir, session) = ready(&fake).await;
    let cwd = session.root_binding().join("pkg");

    let options = exec_options().cwd(cwd);
    let result = session.execute(&args(&["x"]), &options).await.unwrap();

    assert_eq!(result.cwd(), Path::new("/workspace/pkg"));
    let last = fake.calls().into_iter().rev().find_map(|c| match c {
        RuntimeCall::Exec { workdir, .. } => Some(workdir),
        _ => None,
    });
    assert_eq!(last.as_deref(), Some("/workspace/pkg"));
    session.teardown().await;
}

#[test]
fn state_display() {
    assert_eq!(SessionState::TearingDown.to_string(), "tearing-down");
    assert_eq!(SessionState::Executing.to_string(), "executing");
}
