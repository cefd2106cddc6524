//! Runner timeout specs
//!
//! A command that outlives its timeout is killed and reported, never hung on.

use std::time::{Duration, Instant};

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn slow_command_is_killed_at_timeout() {
    let start = Instant::now();
    let options = RunOptions::new(["sleep", "10000"]).timeout_ms(300);
    let result = fixture().run(&options).await.unwrap();

    assert_eq!(result.exit_code(), clinch_core::EXIT_TIMEOUT);
    assert!(result.timed_out());
    assert_eq!(result.stdout(), "sleeping 10000ms\n");
    assert!(result.stderr().contains("timed out after 300ms"), "{}", result.stderr());
    // timeout plus kill and drain slack
    assert!(start.elapsed() < Duration::from_secs(3), "took {:?}", start.elapsed());
}

#[tokio::test]
async fn fast_command_finishes_within_timeout() {
    let options = RunOptions::new(["sleep", "50"]).timeout_ms(5000);
    let result = fixture().run(&options).await.unwrap();
    assert_eq!(result.exit_code(), 0);
    assert!(!result.timed_out());
    assert_eq!(result.stdout(), "sleeping 50ms\nawake\n");
    result.expect_duration_under(Duration::from_secs(5)).unwrap();
}

#[tokio::test]
async fn runner_default_timeout_applies() {
    let runner = CommandRunner::new(
        RunnerConfig::new([FIXTURE]).default_timeout(Duration::from_millis(200)),
    );
    let result = runner.run_args(["sleep", "5000"]).await.unwrap();
    assert!(result.timed_out());
}
