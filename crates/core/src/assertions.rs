// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent assertions on [`RunResult`].
//!
//! Every assertion returns the same result on success so calls chain with `?`:
//!
//! ```ignore
//! result.expect_success()?.expect_output("usage")?.expect_no_stderr()?;
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::{Pattern, RunResult};

/// Longest stream excerpt quoted in an assertion message.
const EXCERPT_CHARS: usize = 200;

/// An expectation on a [`RunResult`] that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{assertion} failed for `{command}`: expected {expected}, got {actual}")]
pub struct AssertionError {
    pub assertion: String,
    pub command: String,
    pub expected: String,
    pub actual: String,
}

impl AssertionError {
    pub fn new(
        assertion: impl Into<String>,
        result: &RunResult,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            assertion: assertion.into(),
            command: result.command_line(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

type Check<'a> = Result<&'a RunResult, AssertionError>;

impl RunResult {
    pub fn expect_success(&self) -> Check<'_> {
        if self.success() {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_success",
            self,
            "exit code 0",
            format!("exit code {} (stderr: {})", self.exit_code(), excerpt(self.stderr())),
        ))
    }

    pub fn expect_failure(&self) -> Check<'_> {
        if !self.success() {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_failure",
            self,
            "a non-zero exit code",
            "exit code 0",
        ))
    }

    pub fn expect_exit(&self, code: i32) -> Check<'_> {
        if self.exit_code() == code {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_exit",
            self,
            format!("exit code {}", code),
            format!("exit code {}", self.exit_code()),
        ))
    }

    /// Exit code must be one of `codes`.
    pub fn expect_exit_in(&self, codes: &[i32]) -> Check<'_> {
        if codes.contains(&self.exit_code()) {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_exit_in",
            self,
            format!("exit code in {:?}", codes),
            format!("exit code {}", self.exit_code()),
        ))
    }

    pub fn expect_output(&self, pattern: impl Into<Pattern>) -> Check<'_> {
        let pattern = pattern.into();
        if pattern.is_match(self.stdout()) {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_output",
            self,
            format!("stdout matching {}", pattern),
            format!("stdout {}", excerpt(self.stdout())),
        ))
    }

    pub fn expect_output_not(&self, pattern: impl Into<Pattern>) -> Check<'_> {
        let pattern = pattern.into();
        if !pattern.is_match(self.stdout()) {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_output_not",
            self,
            format!("stdout not matching {}", pattern),
            format!("stdout {}", excerpt(self.stdout())),
        ))
    }

    pub fn expect_stderr(&self, pattern: impl Into<Pattern>) -> Check<'_> {
        let pattern = pattern.into();
        if pattern.is_match(self.stderr()) {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_stderr",
            self,
            format!("stderr matching {}", pattern),
            format!("stderr {}", excerpt(self.stderr())),
        ))
    }

    /// Whitespace-only stderr counts as empty.
    pub fn expect_no_stderr(&self) -> Check<'_> {
        if self.stderr().trim().is_empty() {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_no_stderr",
            self,
            "empty stderr",
            format!("stderr {}", excerpt(self.stderr())),
        ))
    }

    pub fn expect_no_output(&self) -> Check<'_> {
        if self.stdout().trim().is_empty() {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_no_output",
            self,
            "empty stdout",
            format!("stdout {}", excerpt(self.stdout())),
        ))
    }

    /// Stdout must parse as JSON.
    pub fn expect_json(&self) -> Check<'_> {
        self.parse_json("expect_json").map(|_| self)
    }

    /// Stdout must parse as JSON and satisfy `validator`.
    ///
    /// The validator reports a mismatch as `Err(description)`.
    pub fn expect_json_with<F>(&self, validator: F) -> Check<'_>
    where
        F: FnOnce(&serde_json::Value) -> Result<(), String>,
    {
        let value = self.parse_json("expect_json")?;
        validator(&value).map_err(|reason| {
            AssertionError::new("expect_json", self, "JSON satisfying the validator", reason)
        })?;
        Ok(self)
    }

    /// Stdout length in characters must fall within `min..=max`.
    pub fn expect_output_length(&self, min: usize, max: usize) -> Check<'_> {
        let len = self.stdout().chars().count();
        if (min..=max).contains(&len) {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_output_length",
            self,
            format!("stdout length between {} and {}", min, max),
            format!("length {}", len),
        ))
    }

    pub fn expect_duration_under(&self, limit: Duration) -> Check<'_> {
        if self.duration() < limit {
            return Ok(self);
        }
        Err(AssertionError::new(
            "expect_duration_under",
            self,
            format!("duration under {}ms", limit.as_millis()),
            format!("{}ms", self.duration_ms()),
        ))
    }

    fn parse_json(&self, assertion: &str) -> Result<serde_json::Value, AssertionError> {
        serde_json::from_str(self.stdout().trim()).map_err(|e| {
            AssertionError::new(
                assertion,
                self,
                "stdout to be valid JSON",
                format!("{} in {}", e, excerpt(self.stdout())),
            )
        })
    }
}

/// Quote a stream for a message, truncated to [`EXCERPT_CHARS`].
fn excerpt(text: &str) -> String {
    if text.is_empty() {
        return "<empty>".to_string();
    }
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{:?}…", head)
    } else {
        format!("{:?}", head)
    }
}

#[cfg(test)]
#[path = "assertions_tests.rs"]
mod tests;
