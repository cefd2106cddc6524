// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clinch_core::ValidationError;
use clinch_sandbox::SandboxError;
use thiserror::Error;

/// Errors that prevent a command from running at all.
///
/// Everything that happens once the command runs (non-zero exit, timeout,
/// spawn failure) is reported in the [`RunResult`](clinch_core::RunResult).
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid run options: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "sandbox mode requested for `{command}` but no sandbox session is attached \
         (set one up with SandboxManager::setup and attach it with CommandRunner::with_session)"
    )]
    NoSandboxSession { command: String },

    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}
