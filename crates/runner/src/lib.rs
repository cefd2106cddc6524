// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clinch-runner: run a CLI under test locally or in a sandbox

mod config;
pub mod env;
mod error;
mod local;
mod runner;

pub use config::RunnerConfig;
pub use error::RunError;
pub use runner::CommandRunner;
