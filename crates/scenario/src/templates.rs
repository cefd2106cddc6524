// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ready-made scenarios for behavior most CLIs share.

use clinch_core::{AssertionError, Pattern, RunResult, EXIT_TIMEOUT};
use regex::Regex;

use crate::Scenario;

fn pattern(source: &str) -> Pattern {
    match Regex::new(source) {
        Ok(re) => Pattern::Regex(re),
        Err(_) => Pattern::Contains(source.to_string()),
    }
}

/// `--help` exits 0 and prints usage.
pub fn help() -> Scenario {
    Scenario::new("help")
        .step("--help prints usage")
        .run(["--help"])
        .expect_success()
        .expect_output(pattern(r"(?i)usage"))
}

/// `--version` exits 0 and prints a semantic version.
pub fn version() -> Scenario {
    Scenario::new("version")
        .step("--version prints a version")
        .run(["--version"])
        .expect_success()
        .expect_output(pattern(r"\d+\.\d+\.\d+"))
}

/// An unknown subcommand fails and says something about it.
pub fn invalid_command(name: &str) -> Scenario {
    Scenario::new(format!("invalid command `{}`", name))
        .step(format!("`{}` is rejected", name))
        .run([name])
        .expect_failure()
        .expect("reports an error", reports_something)
}

/// The command succeeds and prints JSON.
pub fn json_output<I, S>(args: I) -> Scenario
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    Scenario::new(format!("json output of `{}`", args.join(" ")))
        .step("prints valid JSON")
        .run(args)
        .expect_success()
        .expect_json()
}

/// Hostile inputs appended to `args` must not crash, hang or kill the CLI.
///
/// Runs concurrently; a normal non-zero exit counts as handled.
pub fn robustness<I, S>(args: I) -> Scenario
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let with = |extra: &str| {
        let mut all = args.clone();
        all.push(extra.to_string());
        all
    };
    Scenario::new(format!("robustness of `{}`", args.join(" ")))
        .concurrent(true)
        .step("unknown flag")
        .run(with("--clinch-unknown-flag"))
        .expect("exits without crashing", exits_cleanly)
        .step("empty argument")
        .run(with(""))
        .expect("exits without crashing", exits_cleanly)
        .step("unicode argument")
        .run(with("ünïcödé-☃-🦀"))
        .expect("exits without crashing", exits_cleanly)
        .step("very long argument")
        .run(with(&"x".repeat(8192)))
        .expect("exits without crashing", exits_cleanly)
}

/// Exit codes at or above 124 are timeouts, spawn failures or signals.
fn exits_cleanly(result: &RunResult) -> Result<(), AssertionError> {
    if result.exit_code() >= 0 && result.exit_code() < EXIT_TIMEOUT {
        return Ok(());
    }
    Err(AssertionError::new(
        "exits_cleanly",
        result,
        format!("an exit code below {}", EXIT_TIMEOUT),
        format!("exit code {}\nstderr: {}", result.exit_code(), result.stderr().trim()),
    ))
}

fn reports_something(result: &RunResult) -> Result<(), AssertionError> {
    if !result.stdout().trim().is_empty() || !result.stderr().trim().is_empty() {
        return Ok(());
    }
    Err(AssertionError::new("reports_error", result, "a message on stdout or stderr", "no output"))
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
