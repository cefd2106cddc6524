//! Local command runner specs
//!
//! The runner captures output, exit codes and metadata of the fixture CLI.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn echo_captures_stdout_and_args() {
    let result = run(&["echo", "hello", "world"]).await;
    assert_eq!(result.stdout(), "hello world\n");
    assert_eq!(result.stderr(), "");
    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.args(), ["echo", "hello", "world"].map(String::from));
    assert_eq!(result.mode(), ExecMode::Local);
}

#[tokio::test]
async fn exit_code_and_stderr_are_captured() {
    let result = run(&["fail", "7"]).await;
    assert_eq!(result.exit_code(), 7);
    assert_eq!(result.stderr(), "failing with exit code 7\n");
    assert!(result.expect_failure().is_ok());
    let err = result.expect_success().unwrap_err();
    assert!(err.to_string().contains("fail 7"), "{}", err);
}

#[tokio::test]
async fn version_and_bad_command() {
    run(&["--version"]).await.expect_success().unwrap().expect_output("clinch-fixture").unwrap();
    let bad = run(&["bad-cmd"]).await;
    assert!(bad.expect_failure().is_ok());
    assert!(bad.expect_stderr("unrecognized subcommand").is_ok(), "{}", bad.stderr());
}

#[tokio::test]
async fn env_is_merged_over_ambient() {
    let options = RunOptions::new(["env", "CLINCH_SPEC_VAR"]).env("CLINCH_SPEC_VAR", "from-options");
    let result = fixture().run(&options).await.unwrap();
    assert_eq!(result.stdout(), "from-options\n");

    // PATH still comes from the ambient environment
    let path = fixture().run_args(["env", "PATH"]).await.unwrap();
    assert!(path.success());
}

#[tokio::test]
async fn cwd_applies_to_the_process() {
    let dir = tempfile::tempdir().unwrap();
    let options = RunOptions::new(["pwd"]).cwd(dir.path());
    let result = fixture().run(&options).await.unwrap();
    let printed = std::path::PathBuf::from(result.stdout().trim());
    assert_eq!(printed.canonicalize().unwrap(), dir.path().canonicalize().unwrap());
}

#[tokio::test]
async fn json_output_parses() {
    let result = run(&["json", "--name", "spec"]).await;
    result
        .expect_json_with(|v| match v["name"].as_str() {
            Some("spec") => Ok(()),
            other => Err(format!("name was {:?}", other)),
        })
        .unwrap();
    let doc: serde_json::Value = result.json().unwrap();
    assert_eq!(doc["ok"], true);
}

#[tokio::test]
async fn flooding_both_streams_completes() {
    let result = run(&["flood", "20000"]).await;
    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.stdout().lines().count(), 20000);
    assert_eq!(result.stderr().lines().count(), 20000);
}

#[tokio::test]
async fn many_concurrent_runs_keep_their_own_output() {
    let runner = fixture();
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let runner = runner.clone();
            tokio::spawn(async move {
                let word = format!("run-{}", i);
                let result = runner.run_args(["echo".to_string(), word.clone()]).await;
                (word, result)
            })
        })
        .collect();
    for handle in handles {
        let (word, result) = handle.await.unwrap();
        assert_eq!(result.unwrap().stdout(), format!("{}\n", word));
    }
}

#[tokio::test]
async fn sandbox_mode_without_session_is_fatal() {
    let options = RunOptions::new(["--version"]).mode(ExecMode::Sandbox);
    let err = fixture().run(&options).await.unwrap_err();
    assert!(matches!(err, RunError::NoSandboxSession { .. }), "{:?}", err);
}

#[tokio::test]
async fn validation_errors_are_reported_before_running() {
    let options = RunOptions::new(["echo"]).timeout(std::time::Duration::ZERO);
    let err = fixture().run(&options).await.unwrap_err();
    assert!(matches!(err, RunError::Validation(_)));
    assert!(err.to_string().contains("timeout"), "{}", err);
}
