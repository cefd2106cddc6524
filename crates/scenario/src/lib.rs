// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clinch-scenario: sequential and concurrent multi-step CLI scenarios

mod error;
mod outcome;
mod scenario;
mod step;
pub mod templates;

pub use error::ScenarioError;
pub use outcome::{FailureCause, ScenarioOutcome, StepFailure};
pub use scenario::Scenario;
pub use step::{Expectation, Step};
