//! Shared helpers for specs.

#![allow(dead_code)]

use std::time::Duration;

pub use clinch_core::{ExecMode, RunOptions, RunResult};
pub use clinch_runner::{CommandRunner, RunError, RunnerConfig};
pub use clinch_scenario::{Scenario, ScenarioError};
pub use similar_asserts::assert_eq;

/// Path of the fixture CLI built alongside these specs.
pub const FIXTURE: &str = env!("CARGO_BIN_EXE_clinch-fixture");

/// Runner targeting the fixture CLI.
pub fn fixture() -> CommandRunner {
    CommandRunner::new(RunnerConfig::new([FIXTURE]).default_timeout(Duration::from_secs(20)))
}

/// Run the fixture with `args` and default options.
pub async fn run(args: &[&str]) -> RunResult {
    match fixture().run_args(args.iter().copied()).await {
        Ok(result) => result,
        Err(e) => panic!("run {:?} failed: {}", args, e),
    }
}
