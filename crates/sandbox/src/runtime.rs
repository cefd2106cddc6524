// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Seam to the external container runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Runtime-assigned container handle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to start one long-lived sandbox container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// `key=value` labels.
    pub labels: Vec<String>,
    /// Host directory and the in-container path it is bound to.
    pub bind: Option<(PathBuf, String)>,
    pub workdir: String,
    pub env: BTreeMap<String, String>,
    /// Keeps the container alive until it is removed.
    pub command: Vec<String>,
}

/// One command to run inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub argv: Vec<String>,
    pub workdir: String,
    pub env: BTreeMap<String, String>,
}

/// Captured outcome of an [`ExecRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Failure category of a runtime call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeErrorKind {
    /// The runtime CLI binary is not installed.
    MissingBinary,
    /// The runtime daemon cannot be reached.
    Unreachable,
    /// The image does not exist or cannot be pulled.
    ImageUnavailable,
    /// Disk, memory, or process limits were hit.
    ResourceExhausted,
    Timeout,
    /// Momentary network or registry errors.
    Transient,
    /// The request itself is malformed.
    Configuration,
    Other,
}

clinch_core::simple_display! {
    RuntimeErrorKind {
        MissingBinary => "missing runtime binary",
        Unreachable => "runtime unreachable",
        ImageUnavailable => "image unavailable",
        ResourceExhausted => "resource exhaustion",
        Timeout => "timeout",
        Transient => "transient error",
        Configuration => "configuration error",
        Other => "runtime error",
    }
}

impl RuntimeErrorKind {
    /// Whether retrying the same call can reasonably succeed.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            RuntimeErrorKind::ResourceExhausted
                | RuntimeErrorKind::Timeout
                | RuntimeErrorKind::Transient
                | RuntimeErrorKind::Other
        )
    }
}

/// Error from a [`ContainerRuntime`] call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// Build an error from runtime CLI stderr, classifying it by content.
    pub fn from_stderr(context: &str, stderr: &str) -> Self {
        Self::new(classify(stderr), format!("{}: {}", context, stderr.trim()))
    }

    pub fn timeout(context: &str, ms: u128) -> Self {
        Self::new(RuntimeErrorKind::Timeout, format!("{} did not finish within {}ms", context, ms))
    }
}

/// Classify runtime CLI stderr into a failure category.
///
/// Order matters: a pull that failed on a network timeout also prints
/// "unable to find image" first, and must stay retryable.
pub fn classify(stderr: &str) -> RuntimeErrorKind {
    let text = stderr.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

    if has(&[
        "cannot connect to the docker daemon",
        "is the docker daemon running",
        "error during connect",
        "cannot connect to podman",
    ]) {
        RuntimeErrorKind::Unreachable
    } else if has(&[
        "pull access denied",
        "manifest unknown",
        "repository does not exist",
        "no such image",
        "not found: manifest",
    ]) {
        RuntimeErrorKind::ImageUnavailable
    } else if has(&[
        "no space left on device",
        "cannot allocate memory",
        "out of memory",
        "too many open files",
        "resource temporarily unavailable",
    ]) {
        RuntimeErrorKind::ResourceExhausted
    } else if has(&["timeout", "timed out", "deadline exceeded"]) {
        RuntimeErrorKind::Timeout
    } else if has(&[
        "connection reset",
        "connection refused",
        "temporary failure",
        "unexpected eof",
        "toomanyrequests",
        "too many requests",
        "service unavailable",
        "bad gateway",
    ]) {
        RuntimeErrorKind::Transient
    } else if has(&[
        "invalid reference format",
        "invalid mount",
        "invalid volume",
        "invalid argument",
        "unknown flag",
        "conflict",
        "is not a valid",
    ]) {
        RuntimeErrorKind::Configuration
    } else if has(&["unable to find image"]) {
        RuntimeErrorKind::ImageUnavailable
    } else {
        RuntimeErrorKind::Other
    }
}

/// Operations the sandbox lifecycle needs from a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Human-readable runtime name for messages (e.g. `docker`).
    fn name(&self) -> &str;

    /// Cheap reachability probe, run before any provisioning.
    async fn ping(&self) -> Result<(), RuntimeError>;

    async fn create(&self, spec: &ContainerSpec) -> Result<ContainerId, RuntimeError>;

    async fn exec(
        &self,
        container: &ContainerId,
        request: &ExecRequest,
    ) -> Result<ExecOutput, RuntimeError>;

    /// Force-remove a container. Removing an unknown container succeeds.
    async fn remove(&self, container: &ContainerId) -> Result<(), RuntimeError>;

    /// All containers (running or not) carrying the `key=value` label.
    async fn list_labeled(&self, label: &str) -> Result<Vec<ContainerId>, RuntimeError>;
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
