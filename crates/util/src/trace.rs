// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opt-in log output for test runs.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter (e.g. `clinch_sandbox=debug`).
pub const LOG_ENV: &str = "CLINCH_LOG";

/// Install a test-writer fmt subscriber filtered by `CLINCH_LOG` (default `warn`).
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
