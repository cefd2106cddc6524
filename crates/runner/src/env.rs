// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the runner crate.

use std::time::Duration;

/// `CLINCH_TEST_CLI` set to `1` or `true` selects the alternate test target.
pub fn use_test_cli() -> bool {
    std::env::var("CLINCH_TEST_CLI")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
        .unwrap_or(false)
}

/// Alternate test target executable from `CLINCH_TEST_CLI_BIN`.
pub fn test_cli_bin() -> Option<String> {
    std::env::var("CLINCH_TEST_CLI_BIN").ok().filter(|s| !s.trim().is_empty())
}

/// Per-run default timeout from `CLINCH_DEFAULT_TIMEOUT_MS`.
///
/// Unparseable or zero values are ignored.
pub fn default_timeout() -> Option<Duration> {
    let raw = std::env::var("CLINCH_DEFAULT_TIMEOUT_MS").ok()?;
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => {
            tracing::warn!(value = %raw, "ignoring invalid CLINCH_DEFAULT_TIMEOUT_MS");
            None
        }
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
