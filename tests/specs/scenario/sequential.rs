//! Sequential scenario specs

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn version_then_bad_command() {
    let outcome = Scenario::new("cli basics")
        .step("version")
        .run(["--version"])
        .expect_success()
        .expect_output("clinch-fixture")
        .step("bad command")
        .run(["bad-cmd"])
        .expect_failure()
        .execute(&fixture(), ExecMode::Local)
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].exit_code(), 0);
    assert_ne!(outcome.results[1].exit_code(), 0);
}

#[tokio::test]
async fn failure_names_step_and_expectation() {
    let err = Scenario::new("broken")
        .step("echo")
        .run(["echo", "one"])
        .expect_output("one")
        .step("wrong expectation")
        .run(["echo", "two"])
        .expect_output("three")
        .execute(&fixture(), ExecMode::Local)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "scenario `broken` failed at step 2 (`wrong expectation`): expect_output failed for \
         `echo two`: expected stdout matching \"three\", got stdout \"two\\n\""
    );
}

#[tokio::test]
async fn empty_scenario_succeeds() {
    let outcome = Scenario::new("nothing").execute(&fixture(), ExecMode::Local).await.unwrap();
    assert!(outcome.success);
    assert!(outcome.results.is_empty());
}
