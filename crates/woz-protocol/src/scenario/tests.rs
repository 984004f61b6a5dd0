//! Unit tests for scenario loading and setup construction.

use std::fs;

use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::command::Setup;
use crate::participant::Role;
use crate::registry::ConstantsRegistry;

const RIDE_SCENARIO: &str = r#"{
    "instructions": {
        "Wizard": {
            "task_description": "Help the user book a ride.",
            "completion_requirements": ["The ride is booked"],
            "completion_questions": ["Was the user polite?"]
        },
        "User": {
            "task_description": "Book a ride to the airport.",
            "completion_requirements": [],
            "completion_questions": ["Did the wizard confirm the price?"]
        }
    },
    "form_description": {"Price": {"type": "integer"}}
}"#;

#[fixture]
fn scenario_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("ride.json"), RIDE_SCENARIO).expect("write scenario");
    fs::write(dir.path().join("broken.json"), "{\"instructions\": [").expect("write scenario");
    dir
}

#[fixture]
fn registry() -> ConstantsRegistry {
    ConstantsRegistry::bundled().expect("bundled registry")
}

#[rstest]
fn loads_scenario_from_directory(scenario_dir: TempDir) {
    let loader = DirectoryScenarioLoader::new(scenario_dir.path());
    let scenario = loader.load("ride").expect("load scenario");
    assert_eq!(scenario.name, "ride");
    let user = scenario.instructions_for("User").expect("user instructions");
    assert_eq!(user.task_description, "Book a ride to the airport.");
    assert!(user.completion_requirements.is_empty());
    assert_eq!(scenario.form_description, json!({"Price": {"type": "integer"}}));
}

#[rstest]
fn missing_scenario_is_not_found(scenario_dir: TempDir) {
    let loader = DirectoryScenarioLoader::new(scenario_dir.path());
    let error = loader.load("unknown").expect_err("missing file");
    assert!(
        matches!(error, ScenarioError::NotFound { ref path } if path.ends_with("unknown.json")),
        "unexpected error: {error}"
    );
}

#[rstest]
fn malformed_scenario_fails_to_parse(scenario_dir: TempDir) {
    let loader = DirectoryScenarioLoader::new(scenario_dir.path());
    let error = loader.load("broken").expect_err("malformed");
    assert!(matches!(error, ScenarioError::Parse { ref name, .. } if name == "broken"));
}

#[rstest]
#[case::parent("../ride")]
#[case::nested("sub/ride")]
#[case::hidden(".ride")]
#[case::empty("")]
fn rejects_names_outside_the_directory(scenario_dir: TempDir, #[case] name: &str) {
    let loader = DirectoryScenarioLoader::new(scenario_dir.path());
    let error = loader.load(name).expect_err("invalid name");
    assert!(matches!(error, ScenarioError::InvalidName { .. }));
}

#[test]
fn form_description_defaults_to_empty_object() {
    let scenario = Scenario::from_json("bare", r#"{"instructions": {}}"#).expect("parse");
    assert_eq!(scenario.form_description, json!({}));
}

#[rstest]
fn setup_embeds_role_instructions(registry: ConstantsRegistry) {
    let scenario = Scenario::from_json("ride", RIDE_SCENARIO).expect("parse");
    let setup = Setup::for_role(&registry, &scenario, Role::Wizard).expect("setup");
    assert_eq!(setup.role_id(), "Wizard");
    assert_eq!(
        serde_json::to_value(setup.message()).expect("serialize"),
        json!({
            "id": "Wizard",
            "text": "",
            "command": "setup",
            "task_description": "Help the user book a ride.",
            "completion_requirements": ["The ride is booked"],
            "completion_questions": ["Was the user polite?"],
            "form_description": {"Price": {"type": "integer"}},
        })
    );
}

#[rstest]
fn setup_fails_for_role_without_instructions(registry: ConstantsRegistry) {
    let scenario = Scenario::from_json(
        "solo",
        r#"{"instructions": {"User": {
            "task_description": "x",
            "completion_requirements": [],
            "completion_questions": []
        }}}"#,
    )
    .expect("parse");
    let error = Setup::for_role(&registry, &scenario, Role::Wizard).expect_err("no wizard");
    assert!(matches!(
        error,
        ScenarioError::MissingRole { ref scenario, ref role } if scenario == "solo" && role == "Wizard"
    ));
}

#[rstest]
fn setup_loads_through_a_loader(registry: ConstantsRegistry, scenario_dir: TempDir) {
    let loader = DirectoryScenarioLoader::new(scenario_dir.path());
    let setup = Setup::load(&registry, &loader, "ride", Role::User).expect("setup");
    assert_eq!(setup.task_description(), "Book a ride to the airport.");

    let error = Setup::load(&registry, &loader, "unknown", Role::User).expect_err("missing");
    assert!(matches!(error, ScenarioError::NotFound { .. }));
}

#[rstest]
#[case::requirements(
    r#"{"instructions": {"Wizard": {"task_description": "x", "completion_questions": []}}}"#,
    "completion_requirements"
)]
#[case::questions(
    r#"{"instructions": {"Wizard": {"task_description": "x", "completion_requirements": []}}}"#,
    "completion_questions"
)]
#[case::task(
    r#"{"instructions": {"Wizard": {"completion_requirements": [], "completion_questions": []}}}"#,
    "task_description"
)]
fn incomplete_role_instructions_fail_to_parse(#[case] json: &str, #[case] field: &str) {
    let error = Scenario::from_json("partial", json).expect_err("incomplete instructions");
    assert!(
        matches!(error, ScenarioError::Parse { ref name, .. } if name == "partial"),
        "unexpected error: {error}"
    );
    assert!(error.to_string().contains(field), "expected '{field}' in '{error}'");
}
