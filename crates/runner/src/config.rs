// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clinch_core::options::validate_timeout;
use clinch_core::{ValidationError, DEFAULT_TIMEOUT};

/// What a [`CommandRunner`](crate::CommandRunner) executes.
///
/// Programs are argv prefixes: the run's args are appended to them, so
/// `["node", "bin/cli.js"]` runs a script through its interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Target program for local runs.
    pub program: Vec<String>,
    /// Target program inside a sandbox. Defaults to `program`.
    pub sandbox_program: Vec<String>,
    /// Alternate local target selected by `CLINCH_TEST_CLI`.
    pub test_program: Option<Vec<String>>,
    /// Timeout for runs that do not set one.
    pub default_timeout: Duration,
}

impl RunnerConfig {
    pub fn new<I, S>(program: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program: Vec<String> = program.into_iter().map(Into::into).collect();
        Self {
            sandbox_program: program.clone(),
            program,
            test_program: None,
            default_timeout: crate::env::default_timeout().unwrap_or(DEFAULT_TIMEOUT),
        }
    }

    clinch_core::setters! {
        set {
            sandbox_program: Vec<String>,
            default_timeout: Duration,
        }
        option {
            test_program: Vec<String>,
        }
    }

    /// Program for local runs after applying the `CLINCH_TEST_CLI` override.
    ///
    /// With the override on: `CLINCH_TEST_CLI_BIN` > `test_program` > `program`.
    pub fn local_program(&self) -> Vec<String> {
        if crate::env::use_test_cli() {
            if let Some(bin) = crate::env::test_cli_bin() {
                return vec![bin];
            }
            if let Some(test_program) = &self.test_program {
                return test_program.clone();
            }
        }
        self.program.clone()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.program.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(ValidationError::Invalid {
                field: "program",
                reason: "must name an executable".to_string(),
            });
        }
        if self.sandbox_program.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(ValidationError::Invalid {
                field: "sandbox_program",
                reason: "must name an executable".to_string(),
            });
        }
        validate_timeout(self.default_timeout)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
