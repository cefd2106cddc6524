//! Built-in scenario template specs

use clinch_scenario::templates;

use crate::prelude::*;

#[tokio::test]
async fn help_version_and_invalid_command_pass_on_the_fixture() {
    let runner = fixture();
    for scenario in [templates::help(), templates::version(), templates::invalid_command("bad-cmd")] {
        let name = scenario.name().to_string();
        let outcome = scenario.execute(&runner, ExecMode::Local).await;
        assert!(matches!(outcome, Ok(ref o) if o.success), "{}: {:?}", name, outcome.err());
    }
}

#[tokio::test]
async fn json_output_template() {
    let outcome = templates::json_output(["json"]).execute(&fixture(), ExecMode::Local).await.unwrap();
    assert!(outcome.success);
}

#[tokio::test]
async fn robustness_template() {
    let outcome = templates::robustness(["echo"]).execute(&fixture(), ExecMode::Local).await.unwrap();
    assert!(outcome.success, "{:?}", outcome.failures);
}
