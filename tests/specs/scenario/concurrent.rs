//! Concurrent scenario specs

use std::time::{Duration, Instant};

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn steps_overlap_and_keep_declaration_order() {
    let start = Instant::now();
    let outcome = Scenario::new("parallel sleeps")
        .concurrent(true)
        .step("slowest")
        .run(["sleep", "400"])
        .expect_output("awake")
        .step("middle")
        .run(["sleep", "200"])
        .expect_output("awake")
        .step("fast")
        .run(["echo", "fast"])
        .expect_output("fast")
        .execute(&fixture(), ExecMode::Local)
        .await
        .unwrap();

    assert!(outcome.success);
    let stdout: Vec<&str> = outcome.results.iter().map(|r| r.stdout()).collect();
    assert_eq!(stdout, vec!["sleeping 400ms\nawake\n", "sleeping 200ms\nawake\n", "fast\n"]);
    assert!(start.elapsed() < Duration::from_millis(1500), "took {:?}", start.elapsed());
}

#[tokio::test]
async fn all_failures_are_reported() {
    let outcome = Scenario::new("mixed")
        .concurrent(true)
        .step("fails 3")
        .run(["fail", "3"])
        .expect_success()
        .step("passes")
        .run(["echo", "ok"])
        .expect_success()
        .step("fails 4")
        .run(["fail", "4"])
        .expect_exit(0)
        .execute(&fixture(), ExecMode::Local)
        .await
        .unwrap();

    assert!(!outcome.success);
    let failed: Vec<(usize, &str)> =
        outcome.failures.iter().map(|f| (f.index, f.description.as_str())).collect();
    assert_eq!(failed, vec![(0, "fails 3"), (2, "fails 4")]);
    assert_eq!(outcome.results.len(), 3);

    let json = outcome.to_json();
    assert_eq!(json["failures"][1]["index"], 2);
    assert!(json["failures"][1]["error"].as_str().unwrap().contains("expect_exit"));

    assert!(matches!(outcome.ensure_success(), Err(ScenarioError::Failed { .. })));
}
