// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clinch_core::{AssertionError, RunResult};
use clinch_runner::RunError;
use thiserror::Error;

use crate::StepFailure;

/// Errors from [`Scenario::execute`](crate::Scenario::execute).
///
/// Step numbers in messages are 1-based; `index` fields are 0-based.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario `{scenario}` has an invalid step {} (`{description}`): {reason}", .index + 1)]
    InvalidStep { scenario: String, index: usize, description: String, reason: String },

    #[error("scenario `{scenario}` failed at step {} (`{description}`): {reason}", .index + 1)]
    StepFailed {
        scenario: String,
        index: usize,
        description: String,
        reason: AssertionError,
        /// Results of every step that ran, including the failing one.
        results: Vec<RunResult>,
    },

    #[error("scenario `{scenario}` could not run step {} (`{description}`): {source}", .index + 1)]
    Run {
        scenario: String,
        index: usize,
        description: String,
        source: RunError,
        /// Results of the steps that did run.
        results: Vec<RunResult>,
    },

    #[error("scenario `{scenario}` failed: {}", summarize(.failures))]
    Failed { scenario: String, failures: Vec<StepFailure> },
}

fn summarize(failures: &[StepFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("step {} (`{}`): {}", f.index + 1, f.description, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}
