// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clinch-sandbox: container-backed sandboxes for CLI tests

pub mod docker;
pub mod env;
mod error;
mod manager;
pub mod options;
pub mod runtime;
mod session;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use docker::DockerCli;
pub use error::{SandboxError, SetupStage, UnavailableCause};
pub use manager::{sweep_labeled, SandboxManager, CONTAINER_PREFIX, MANAGED_LABEL, SESSION_LABEL_KEY};
pub use options::{SandboxOptions, DEFAULT_SETUP_TIMEOUT, DEFAULT_WORKDIR};
pub use runtime::{
    ContainerId, ContainerRuntime, ContainerSpec, ExecOutput, ExecRequest, RuntimeError,
    RuntimeErrorKind,
};
pub use session::{ExecOptions, SandboxSession, SessionState};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntime, RuntimeCall};
