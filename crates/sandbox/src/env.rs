// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the sandbox crate.
//!
//! Runtime discovery variables such as `DOCKER_HOST` are not read here; the
//! runtime CLI inherits them from this process.

/// Default image for new sandboxes.
pub const DEFAULT_IMAGE: &str = "node:20-alpine";

/// Container runtime CLI: `CLINCH_CONTAINER_RUNTIME` > `docker`.
pub fn runtime_binary() -> String {
    std::env::var("CLINCH_CONTAINER_RUNTIME")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "docker".to_string())
}

/// Sandbox image: `CLINCH_SANDBOX_IMAGE` > [`DEFAULT_IMAGE`].
pub fn default_image() -> String {
    std::env::var("CLINCH_SANDBOX_IMAGE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
