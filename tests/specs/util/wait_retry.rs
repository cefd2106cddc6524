//! Wait and retry utility specs

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clinch_util::{retry, wait_for, wait_until, WaitError};

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn wait_for_returns_once_counter_reaches_three() {
    let counter = Arc::new(AtomicU32::new(0));
    let value = wait_for(Duration::from_secs(2), Duration::from_millis(10), || {
        let counter = Arc::clone(&counter);
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            (n >= 3).then_some(n)
        }
    })
    .await
    .unwrap();
    assert_eq!(value, 3);
}

#[tokio::test]
async fn wait_until_times_out_naming_the_timeout() {
    let err = wait_until(Duration::from_millis(100), Duration::from_millis(20), || async { false })
        .await
        .unwrap_err();
    assert!(matches!(err, WaitError::Timeout { timeout_ms: 100, .. }));
    assert!(err.to_string().contains("100ms"));
}

#[tokio::test]
async fn wait_for_a_file_written_by_the_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pwd.txt");
    let runner = fixture();
    let options = RunOptions::new(["pwd"]).cwd(dir.path());
    let writer = {
        let out = out.clone();
        async move {
            let result = runner.run(&options).await.unwrap();
            std::fs::write(&out, result.stdout()).unwrap();
        }
    };
    let waiter = wait_until(Duration::from_secs(10), Duration::from_millis(20), || {
        let out = out.clone();
        async move { out.exists() }
    });
    let ((), waited) = tokio::join!(writer, waiter);
    waited.unwrap();
}

#[tokio::test]
async fn retry_fails_twice_then_succeeds_in_three_calls() {
    let calls = Arc::new(AtomicU32::new(0));
    let value = retry(5, Duration::from_millis(10), |attempt| {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            if attempt < 3 {
                Err(format!("attempt {} failed", attempt))
            } else {
                Ok("done")
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(value, "done");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_returns_last_error_when_exhausted() {
    let err = retry(2, Duration::from_millis(1), |attempt| async move {
        Err::<(), _>(format!("attempt {}", attempt))
    })
    .await
    .unwrap_err();
    assert_eq!(err, "attempt 2");
}
