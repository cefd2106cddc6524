// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clinch-core: shared types for the clinch CLI testing toolkit

pub mod macros;

pub mod assertions;
pub mod backoff;
pub mod id;
pub mod mode;
pub mod options;
pub mod pattern;
pub mod result;

pub use assertions::AssertionError;
pub use backoff::Backoff;
pub use id::SessionId;
pub use mode::ExecMode;
pub use options::{RunOptions, ValidationError, DEFAULT_TIMEOUT, MAX_TIMEOUT};
pub use pattern::Pattern;
#[cfg(any(test, feature = "test-support"))]
pub use result::RunResultBuilder;
pub use result::{
    RunRecord, RunResult, EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND, EXIT_RUNTIME_FAILURE, EXIT_TIMEOUT,
};
