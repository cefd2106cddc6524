// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Condition polling.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("condition not met within {timeout_ms}ms ({polls} polls)")]
    Timeout { timeout_ms: u128, polls: u32 },
}

/// Poll `condition` every `interval` until it yields `Some`, or fail once
/// `timeout` has elapsed.
///
/// The condition is always evaluated at least once, and once more at the
/// deadline, so the total wait never exceeds `timeout` plus one interval.
pub async fn wait_for<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut condition: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    let mut polls = 0u32;
    loop {
        polls += 1;
        if let Some(value) = condition().await {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            tracing::debug!(timeout_ms = timeout.as_millis() as u64, polls, "wait_for timed out");
            return Err(WaitError::Timeout { timeout_ms: timeout.as_millis(), polls });
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// [`wait_for`] for plain boolean conditions.
pub async fn wait_until<F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut condition: F,
) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    wait_for(timeout, interval, || {
        let fut = condition();
        async move { fut.await.then_some(()) }
    })
    .await
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
