// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use clinch_core::{AssertionError, RunOptions, RunResult};

type CheckFn = dyn Fn(&RunResult) -> Result<(), AssertionError> + Send + Sync;

/// A labeled check run against a step's result.
pub struct Expectation {
    label: String,
    check: Box<CheckFn>,
}

impl Expectation {
    pub fn new<F>(label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&RunResult) -> Result<(), AssertionError> + Send + Sync + 'static,
    {
        Self { label: label.into(), check: Box::new(check) }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn check(&self, result: &RunResult) -> Result<(), AssertionError> {
        (self.check)(result)
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expectation").field(&self.label).finish()
    }
}

/// One command and the expectations on its result.
#[derive(Debug)]
pub struct Step {
    pub description: String,
    pub command: Option<RunOptions>,
    pub expectations: Vec<Expectation>,
}

impl Step {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), command: None, expectations: Vec::new() }
    }

    /// Why this step cannot run, if anything.
    pub(crate) fn defect(&self) -> Option<&'static str> {
        if self.command.is_none() {
            Some("step has no command")
        } else if self.expectations.is_empty() {
            Some("step has no expectations")
        } else {
            None
        }
    }

    /// Run expectations in order, stopping at the first failure.
    pub fn verify(&self, result: &RunResult) -> Result<(), AssertionError> {
        for expectation in &self.expectations {
            expectation.check(result)?;
        }
        Ok(())
    }
}
