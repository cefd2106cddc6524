// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clinch_core::options::{validate_env_name, validate_timeout};
use clinch_core::{Backoff, ValidationError};

/// In-container path the root directory is bound to.
pub const DEFAULT_WORKDIR: &str = "/workspace";

/// Bound on each runtime call made while provisioning or tearing down.
pub const DEFAULT_SETUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Options for [`SandboxManager::setup`](crate::SandboxManager::setup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxOptions {
    /// Host directory bound into the sandbox at `workdir`.
    pub root_dir: PathBuf,
    pub image: String,
    pub timeout: Duration,
    /// Retry policy for provisioning and the health probe.
    pub backoff: Backoff,
    /// Command that must exit 0 inside the sandbox before it is ready.
    pub health_probe: Vec<String>,
    pub workdir: String,
    /// Environment baked into the container itself.
    pub env: BTreeMap<String, String>,
}

impl SandboxOptions {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            image: crate::env::default_image(),
            timeout: DEFAULT_SETUP_TIMEOUT,
            backoff: Backoff::default(),
            health_probe: vec!["true".to_string()],
            workdir: DEFAULT_WORKDIR.to_string(),
            env: BTreeMap::new(),
        }
    }

    clinch_core::setters! {
        into {
            image: String,
            workdir: String,
        }
        set {
            timeout: Duration,
            backoff: Backoff,
            health_probe: Vec<String>,
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.backoff.max_attempts = attempts;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match std::fs::metadata(&self.root_dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(invalid(
                    "root_dir",
                    format!("{} is not a directory", self.root_dir.display()),
                ))
            }
            Err(e) => {
                return Err(invalid("root_dir", format!("{}: {}", self.root_dir.display(), e)))
            }
        }
        if self.image.trim().is_empty() {
            return Err(invalid("image", "must not be empty"));
        }
        validate_timeout(self.timeout)?;
        if self.backoff.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }
        if self.health_probe.is_empty() {
            return Err(invalid("health_probe", "must name a command"));
        }
        if !self.workdir.starts_with('/') {
            return Err(invalid("workdir", format!("{:?} is not an absolute path", self.workdir)));
        }
        for name in self.env.keys() {
            validate_env_name(name)?;
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::Invalid { field, reason: reason.into() }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
