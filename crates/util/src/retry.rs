// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry helpers.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use clinch_core::Backoff;

/// Invoke `action` up to `max_attempts` times with a fixed `delay` between
/// attempts, returning the first success or the last error.
///
/// `max_attempts` of zero is treated as one: the action always runs at least
/// once.
pub async fn retry<T, E, F, Fut>(max_attempts: u32, delay: Duration, action: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_with_backoff(&Backoff::fixed(delay, max_attempts), action).await
}

/// Like [`retry`] but with the delay growth of `backoff`.
///
/// The action receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(backoff: &Backoff, mut action: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match action(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if backoff.allows_retry(attempt) => {
                let delay = backoff.delay_after(attempt);
                tracing::debug!(
                    attempt,
                    max_attempts = backoff.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
