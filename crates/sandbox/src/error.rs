// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clinch_core::{SessionId, ValidationError};
use thiserror::Error;

use crate::runtime::{RuntimeError, RuntimeErrorKind};
use crate::SessionState;

/// Likely reason a sandbox could not be made ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableCause {
    RuntimeUnreachable,
    ImageUnavailable,
    ResourceExhausted,
    Timeout,
    Configuration,
    /// The container started but the health probe never passed.
    HealthCheckFailed,
    Unknown,
}

clinch_core::simple_display! {
    UnavailableCause {
        RuntimeUnreachable => "runtime unreachable",
        ImageUnavailable => "image unavailable",
        ResourceExhausted => "resource exhaustion",
        Timeout => "timeout",
        Configuration => "configuration error",
        HealthCheckFailed => "health check failed",
        Unknown => "unknown",
    }
}

impl From<RuntimeErrorKind> for UnavailableCause {
    fn from(kind: RuntimeErrorKind) -> Self {
        match kind {
            RuntimeErrorKind::MissingBinary | RuntimeErrorKind::Unreachable => {
                UnavailableCause::RuntimeUnreachable
            }
            RuntimeErrorKind::ImageUnavailable => UnavailableCause::ImageUnavailable,
            RuntimeErrorKind::ResourceExhausted => UnavailableCause::ResourceExhausted,
            RuntimeErrorKind::Timeout => UnavailableCause::Timeout,
            RuntimeErrorKind::Configuration => UnavailableCause::Configuration,
            RuntimeErrorKind::Transient | RuntimeErrorKind::Other => UnavailableCause::Unknown,
        }
    }
}

/// Setup phase an [`SandboxError::Unavailable`] was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    Provision,
    HealthCheck,
}

clinch_core::simple_display! {
    SetupStage {
        Provision => "provisioning",
        HealthCheck => "health check",
    }
}

/// Errors from sandbox lifecycle operations.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("invalid sandbox options: {0}")]
    InvalidOptions(#[from] ValidationError),

    /// The runtime could not be reached at all; callers may skip instead of fail.
    #[error("container runtime `{runtime}` is unavailable: {reason}")]
    RuntimeUnavailable { runtime: String, reason: String },

    #[error(
        "sandbox unavailable ({cause}) during {stage} of image {image} for {}: \
         gave up after {attempts} attempt(s): {last_error}",
        root_dir.display()
    )]
    Unavailable {
        cause: UnavailableCause,
        stage: SetupStage,
        image: String,
        root_dir: PathBuf,
        attempts: u32,
        #[source]
        last_error: RuntimeError,
    },

    #[error("sandbox session {id} is closed")]
    SessionClosed { id: SessionId },

    #[error("sandbox session {id} is not ready (state: {state})")]
    NotReady { id: SessionId, state: SessionState },
}

impl SandboxError {
    /// True when the runtime itself is missing or unreachable.
    pub fn is_runtime_unavailable(&self) -> bool {
        matches!(self, SandboxError::RuntimeUnavailable { .. })
    }
}
