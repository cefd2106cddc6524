// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn default_doubles_from_initial() {
    let backoff = Backoff::default();
    assert_eq!(backoff.delay_after(1), Duration::from_millis(250));
    assert_eq!(backoff.delay_after(2), Duration::from_millis(500));
    assert_eq!(backoff.delay_after(3), Duration::from_millis(1000));
}

#[test]
fn delay_is_capped() {
    let backoff = Backoff::default().max_delay(Duration::from_millis(600));
    assert_eq!(backoff.delay_after(5), Duration::from_millis(600));
}

#[test]
fn fixed_never_grows() {
    let backoff = Backoff::fixed(Duration::from_millis(10), 3);
    for attempt in 1..10 {
        assert_eq!(backoff.delay_after(attempt), Duration::from_millis(10));
    }
}

#[yare::parameterized(
    first = { 1, true },
    second = { 2, true },
    last = { 3, false },
)]
fn allows_retry_until_max_attempts(attempt: u32, allowed: bool) {
    assert_eq!(Backoff::default().allows_retry(attempt), allowed);
}

proptest! {
    #[test]
    fn delays_are_monotonic_and_bounded(
        initial_ms in 1u64..1_000,
        factor in 1u32..5,
        cap_ms in 1u64..20_000,
        attempt in 1u32..64,
    ) {
        let backoff = Backoff::default()
            .initial(Duration::from_millis(initial_ms))
            .factor(factor)
            .max_delay(Duration::from_millis(cap_ms));
        let current = backoff.delay_after(attempt);
        let next = backoff.delay_after(attempt + 1);
        prop_assert!(next >= current);
        prop_assert!(current <= Duration::from_millis(cap_ms.max(initial_ms)));
    }
}
