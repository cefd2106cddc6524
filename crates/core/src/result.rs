// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable capture of one executed command.
//!
//! A [`RunResult`] is produced at the end of a single invocation (local or
//! sandboxed) and never changes afterwards. Failures of the target command
//! (non-zero exit, timeout, spawn failure) are data here, not errors; callers
//! turn them into failures with the `expect_*` assertions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::ExecMode;

/// Exit code synthesized when the runner kills a command at its timeout.
pub const EXIT_TIMEOUT: i32 = 124;
/// Exit code synthesized when the container runtime call itself failed.
pub const EXIT_RUNTIME_FAILURE: i32 = 125;
/// Exit code synthesized when the executable exists but cannot be run.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
/// Exit code synthesized when the executable cannot be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Outcome of one command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    exit_code: i32,
    stdout: String,
    stderr: String,
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    duration: Duration,
    cwd: PathBuf,
    args: Vec<String>,
    mode: ExecMode,
    timed_out: bool,
}

/// Raw parts of a [`RunResult`], filled in by whoever executed the command.
#[derive(Debug, Clone, Default)]
pub struct RunRecord {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub cwd: PathBuf,
    pub args: Vec<String>,
    pub mode: ExecMode,
    pub timed_out: bool,
}

impl From<RunRecord> for RunResult {
    fn from(record: RunRecord) -> Self {
        Self {
            exit_code: record.exit_code,
            stdout: record.stdout,
            stderr: record.stderr,
            duration: record.duration,
            cwd: record.cwd,
            args: record.args,
            mode: record.mode,
            timed_out: record.timed_out,
        }
    }
}

impl RunResult {
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// True when the runner killed the command at its timeout.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Arguments joined for display in messages.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            "<no args>".to_string()
        } else {
            self.args.join(" ")
        }
    }

    /// Deserialize stdout as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.stdout.trim())
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

crate::builder! {
    pub struct RunResultBuilder => RunResult {
        into {
            stdout: String = "",
            stderr: String = "",
            cwd: PathBuf = "/tmp",
        }
        set {
            exit_code: i32 = 0,
            duration: Duration = Duration::from_millis(5),
            args: Vec<String> = Vec::new(),
            mode: ExecMode = ExecMode::Local,
            timed_out: bool = false,
        }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
