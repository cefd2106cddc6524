// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clinch-util: generic helpers for test authors

pub mod retry;
pub mod temp;
pub mod trace;
pub mod wait;

pub use retry::{retry, retry_with_backoff};
pub use temp::{
    cleanup_temp_files, create_temp_file, create_temp_file_in, CleanupReport, TempFiles,
};
pub use trace::init_test_tracing;
pub use wait::{wait_for, wait_until, WaitError};
