// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt::Display;

use clinch_core::{AssertionError, RunResult};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::ScenarioError;

/// Why a step in a concurrent scenario failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// The runner refused or could not start the command.
    #[error("could not run: {0}")]
    Run(String),
}

/// A step whose expectations did not hold, or that could not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFailure {
    pub index: usize,
    pub description: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: FailureCause,
}

/// Aggregate result of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub name: String,
    pub success: bool,
    /// One result per step, in step order.
    pub results: Vec<RunResult>,
    pub concurrent: bool,
    pub failures: Vec<StepFailure>,
}

impl ScenarioOutcome {
    /// Turn a failed outcome into [`ScenarioError::Failed`].
    pub fn ensure_success(self) -> Result<Self, ScenarioError> {
        if self.success {
            Ok(self)
        } else {
            Err(ScenarioError::Failed { scenario: self.name, failures: self.failures })
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn serialize_display<T: Display, S: Serializer>(error: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
