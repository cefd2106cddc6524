// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation run options and their eager validation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::ExecMode;

/// Timeout applied when neither the options nor the runner configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Upper bound accepted for a single invocation.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Malformed options, detected before anything is executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("timeout of {ms}ms exceeds the maximum of {max_ms}ms")]
    TimeoutTooLarge { ms: u128, max_ms: u128 },

    #[error("working directory {} does not exist", path.display())]
    MissingCwd { path: PathBuf },

    #[error("working directory {} is not a directory", path.display())]
    CwdNotDirectory { path: PathBuf },

    #[error("invalid environment variable name {name:?}")]
    InvalidEnvName { name: String },

    #[error("value of environment variable {name} contains a NUL byte")]
    NulInEnvValue { name: String },

    #[error("argument {index} ({arg:?}) contains a NUL byte")]
    NulInArgument { index: usize, arg: String },

    #[error("unknown execution mode {0:?} (expected \"local\" or \"sandbox\")")]
    UnknownMode(String),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Options for one command invocation.
///
/// `env` entries are merged over the ambient environment of wherever the
/// command runs; they never replace it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    /// `None` defers to the runner's configured default.
    pub timeout: Option<Duration>,
    pub mode: ExecMode,
}

impl RunOptions {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { args: args.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    crate::setters! {
        set {
            mode: ExecMode,
        }
        option {
            cwd: PathBuf,
            timeout: Duration,
        }
    }

    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env.extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The effective timeout given a fallback default.
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }

    /// Validate everything that can be checked without executing.
    ///
    /// The working directory is only checked on the host for local mode; in
    /// sandbox mode it names a path inside the sandbox.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(timeout) = self.timeout {
            validate_timeout(timeout)?;
        }
        for (index, arg) in self.args.iter().enumerate() {
            if arg.contains('\0') {
                return Err(ValidationError::NulInArgument { index, arg: arg.clone() });
            }
        }
        for (name, value) in &self.env {
            validate_env_name(name)?;
            if value.contains('\0') {
                return Err(ValidationError::NulInEnvValue { name: name.clone() });
            }
        }
        if let (ExecMode::Local, Some(cwd)) = (self.mode, &self.cwd) {
            validate_dir(cwd)?;
        }
        Ok(())
    }
}

/// Reject zero and absurdly large timeouts.
pub fn validate_timeout(timeout: Duration) -> Result<(), ValidationError> {
    if timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout);
    }
    if timeout > MAX_TIMEOUT {
        return Err(ValidationError::TimeoutTooLarge {
            ms: timeout.as_millis(),
            max_ms: MAX_TIMEOUT.as_millis(),
        });
    }
    Ok(())
}

/// Portable environment variable names: non-empty, no `=`, no NUL.
pub fn validate_env_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(ValidationError::InvalidEnvName { name: name.to_string() });
    }
    Ok(())
}

/// The path must exist and be a directory.
pub fn validate_dir(path: &Path) -> Result<(), ValidationError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ValidationError::CwdNotDirectory { path: path.to_path_buf() }),
        Err(_) => Err(ValidationError::MissingCwd { path: path.to_path_buf() }),
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
