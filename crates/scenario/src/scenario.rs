// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-step scenarios with per-step expectations.

use std::time::Duration;

use clinch_core::{
    AssertionError, ExecMode, Pattern, RunOptions, RunRecord, RunResult, EXIT_RUNTIME_FAILURE,
};
use clinch_runner::{CommandRunner, RunError};
use futures_util::future::join_all;
use tracing::Instrument;

use crate::{Expectation, FailureCause, ScenarioError, ScenarioOutcome, Step, StepFailure};

/// An ordered list of steps, run one after another or all at once.
///
/// Built fluently; structural problems (a step with no command or no
/// expectations) are reported by [`execute`](Self::execute), not here.
///
/// ```ignore
/// let outcome = Scenario::new("version")
///     .step("prints version")
///     .run(["--version"])
///     .expect_success()
///     .expect_output(Pattern::regex(r"\d+\.\d+\.\d+")?)
///     .execute(&runner, ExecMode::Local)
///     .await?;
/// ```
#[derive(Debug)]
pub struct Scenario {
    name: String,
    steps: Vec<Step>,
    concurrent: bool,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), steps: Vec::new(), concurrent: false }
    }

    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    /// Start a new step.
    pub fn step(mut self, description: impl Into<String>) -> Self {
        self.steps.push(Step::new(description));
        self
    }

    /// Set the current step's command (local options, default timeout).
    pub fn run<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_with(RunOptions::new(args))
    }

    /// Set the current step's command.
    ///
    /// Opens an implicit step when there is none yet or the current one
    /// already has a command.
    pub fn run_with(mut self, options: RunOptions) -> Self {
        if self.steps.last().map_or(true, |s| s.command.is_some()) {
            self.push_implicit();
        }
        if let Some(step) = self.steps.last_mut() {
            step.command = Some(options);
        }
        self
    }

    /// Add a custom expectation to the current step.
    pub fn expect<F>(mut self, label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&RunResult) -> Result<(), AssertionError> + Send + Sync + 'static,
    {
        if self.steps.is_empty() {
            self.push_implicit();
        }
        if let Some(step) = self.steps.last_mut() {
            step.expectations.push(Expectation::new(label, check));
        }
        self
    }

    fn push_implicit(&mut self) {
        let description = format!("step {}", self.steps.len() + 1);
        self.steps.push(Step::new(description));
    }

    pub fn expect_success(self) -> Self {
        self.expect("success", |r| r.expect_success().map(drop))
    }

    pub fn expect_failure(self) -> Self {
        self.expect("failure", |r| r.expect_failure().map(drop))
    }

    pub fn expect_exit(self, code: i32) -> Self {
        self.expect(format!("exit {}", code), move |r| r.expect_exit(code).map(drop))
    }

    pub fn expect_exit_in(self, codes: impl Into<Vec<i32>>) -> Self {
        let codes = codes.into();
        self.expect(format!("exit in {:?}", codes), move |r| r.expect_exit_in(&codes).map(drop))
    }

    pub fn expect_output(self, pattern: impl Into<Pattern>) -> Self {
        let pattern = pattern.into();
        self.expect(format!("stdout matches {}", pattern), move |r| {
            r.expect_output(pattern.clone()).map(drop)
        })
    }

    pub fn expect_output_not(self, pattern: impl Into<Pattern>) -> Self {
        let pattern = pattern.into();
        self.expect(format!("stdout does not match {}", pattern), move |r| {
            r.expect_output_not(pattern.clone()).map(drop)
        })
    }

    pub fn expect_stderr(self, pattern: impl Into<Pattern>) -> Self {
        let pattern = pattern.into();
        self.expect(format!("stderr matches {}", pattern), move |r| {
            r.expect_stderr(pattern.clone()).map(drop)
        })
    }

    pub fn expect_no_stderr(self) -> Self {
        self.expect("no stderr", |r| r.expect_no_stderr().map(drop))
    }

    pub fn expect_no_output(self) -> Self {
        self.expect("no stdout", |r| r.expect_no_output().map(drop))
    }

    pub fn expect_json(self) -> Self {
        self.expect("stdout is JSON", |r| r.expect_json().map(drop))
    }

    pub fn expect_json_with<F>(self, validator: F) -> Self
    where
        F: Fn(&serde_json::Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.expect("stdout is matching JSON", move |r| r.expect_json_with(&validator).map(drop))
    }

    pub fn expect_output_length(self, min: usize, max: usize) -> Self {
        self.expect(format!("stdout length in {}..={}", min, max), move |r| {
            r.expect_output_length(min, max).map(drop)
        })
    }

    pub fn expect_duration_under(self, limit: Duration) -> Self {
        self.expect(format!("duration under {:?}", limit), move |r| {
            r.expect_duration_under(limit).map(drop)
        })
    }

    /// Run every step through `runner` in `mode`.
    ///
    /// Sequential scenarios stop at the first failing step and return
    /// [`ScenarioError::StepFailed`]. Concurrent scenarios run every step
    /// and report failures in the outcome, including steps the runner
    /// refused, so `results[i]` always belongs to step `i`.
    pub async fn execute(
        &self,
        runner: &CommandRunner,
        mode: ExecMode,
    ) -> Result<ScenarioOutcome, ScenarioError> {
        let planned = self.validate(mode)?;
        let span = tracing::info_span!(
            "scenario.execute",
            scenario = %self.name,
            steps = planned.len(),
            concurrent = self.concurrent,
            %mode,
        );
        async {
            let outcome = if self.concurrent {
                self.execute_concurrent(runner, mode, &planned).await
            } else {
                self.execute_sequential(runner, mode, &planned).await
            };
            match &outcome {
                Ok(o) if o.success => tracing::info!("scenario passed"),
                Ok(o) => tracing::info!(failures = o.failures.len(), "scenario failed"),
                Err(e) => tracing::info!(error = %e, "scenario failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Check structure and options, pairing each step with its command.
    ///
    /// Runs before anything launches, so an invalid step never leaves the
    /// others half-executed.
    fn validate(&self, mode: ExecMode) -> Result<Vec<(&Step, &RunOptions)>, ScenarioError> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let invalid = |reason: String| ScenarioError::InvalidStep {
                    scenario: self.name.clone(),
                    index,
                    description: step.description.clone(),
                    reason,
                };
                let command = match (step.defect(), &step.command) {
                    (None, Some(command)) => command,
                    (defect, _) => {
                        return Err(invalid(defect.unwrap_or("step has no command").to_string()))
                    }
                };
                RunOptions::clone(command)
                    .mode(mode)
                    .validate()
                    .map_err(|e| invalid(e.to_string()))?;
                Ok((step, command))
            })
            .collect()
    }

    async fn execute_sequential(
        &self,
        runner: &CommandRunner,
        mode: ExecMode,
        planned: &[(&Step, &RunOptions)],
    ) -> Result<ScenarioOutcome, ScenarioError> {
        let mut results = Vec::with_capacity(planned.len());
        for (index, (step, command)) in planned.iter().enumerate() {
            tracing::debug!(index, step = %step.description, "running step");
            let result = match runner.run(&RunOptions::clone(command).mode(mode)).await {
                Ok(result) => result,
                Err(source) => {
                    return Err(ScenarioError::Run {
                        scenario: self.name.clone(),
                        index,
                        description: step.description.clone(),
                        source,
                        results,
                    })
                }
            };
            let verdict = step.verify(&result);
            results.push(result);
            if let Err(reason) = verdict {
                return Err(ScenarioError::StepFailed {
                    scenario: self.name.clone(),
                    index,
                    description: step.description.clone(),
                    reason,
                    results,
                });
            }
        }
        Ok(ScenarioOutcome {
            name: self.name.clone(),
            success: true,
            results,
            concurrent: false,
            failures: Vec::new(),
        })
    }

    async fn execute_concurrent(
        &self,
        runner: &CommandRunner,
        mode: ExecMode,
        planned: &[(&Step, &RunOptions)],
    ) -> Result<ScenarioOutcome, ScenarioError> {
        let runs = planned.iter().map(|(_, command)| {
            let options = RunOptions::clone(command).mode(mode);
            async move { runner.run(&options).await }
        });
        let settled = join_all(runs).await;

        let mut results = Vec::with_capacity(planned.len());
        let mut failures = Vec::new();
        for (index, ((step, command), outcome)) in planned.iter().zip(settled).enumerate() {
            let (result, error) = match outcome {
                Ok(result) => {
                    let error = step.verify(&result).err().map(FailureCause::from);
                    (result, error)
                }
                Err(source) => {
                    tracing::warn!(
                        index,
                        step = %step.description,
                        error = %source,
                        "step could not run"
                    );
                    let cause = FailureCause::Run(source.to_string());
                    (unrun_result(command, mode, &source), Some(cause))
                }
            };
            if let Some(error) = error {
                failures.push(StepFailure { index, description: step.description.clone(), error });
            }
            results.push(result);
        }
        Ok(ScenarioOutcome {
            name: self.name.clone(),
            success: failures.is_empty(),
            results,
            concurrent: true,
            failures,
        })
    }
}

/// Placeholder result for a concurrent step the runner refused, keeping
/// `results` aligned with the steps.
fn unrun_result(command: &RunOptions, mode: ExecMode, error: &RunError) -> RunResult {
    RunRecord {
        exit_code: EXIT_RUNTIME_FAILURE,
        stderr: format!("clinch: {}\n", error),
        cwd: command.cwd.clone().unwrap_or_default(),
        args: command.args.clone(),
        mode,
        ..RunRecord::default()
    }
    .into()
}

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod tests;
