use std::io::Write;
use std::time::Duration;

use cyberdrill::config;
use cyberdrill::error::CyberdrillError;

fn write_scenario(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn empty_scenario_loads_with_defaults() {
    let file = write_scenario("{}");
    let scenario = config::load(file.path()).unwrap();
    assert_eq!(scenario.exercise.target, "Enterprise Web Application");
    assert_eq!(scenario.agents.red.len(), 4);
    assert_eq!(scenario.workflow.nodes.len(), 6);
}

#[test]
fn custom_scenario_overrides_defaults() {
    let file = write_scenario(
        "exercise:\n\
         \x20 name: night drill\n\
         \x20 target: Payment Gateway\n\
         timings:\n\
         \x20 attack_advance: 500ms\n\
         defense:\n\
         \x20 success_probability: 0.25\n\
         \x20 seed: 99\n",
    );
    let scenario = config::load(file.path()).unwrap();
    assert_eq!(scenario.exercise.name, "night drill");
    assert_eq!(scenario.exercise.target, "Payment Gateway");
    assert_eq!(
        scenario.stage_timings().unwrap().attack_advance,
        Duration::from_millis(500)
    );
    assert_eq!(scenario.defense.seed, Some(99));
}

#[test]
fn missing_file_is_reported() {
    let err = config::load(std::path::Path::new("/nonexistent/scenario.yaml")).unwrap_err();
    assert!(matches!(
        err,
        CyberdrillError::Config(cyberdrill::error::ConfigError::MissingFile { .. })
    ));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let file = write_scenario("exercise: [not: a, mapping");
    let err = config::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        CyberdrillError::Config(cyberdrill::error::ConfigError::ParseError { .. })
    ));
}

#[test]
fn out_of_range_probability_fails_validation() {
    let file = write_scenario("defense:\n  success_probability: 2.0\n");
    let err = config::load(file.path()).unwrap_err();
    let CyberdrillError::Config(cyberdrill::error::ConfigError::ValidationError {
        errors, ..
    }) = err
    else {
        panic!("expected validation error, got {err}");
    };
    assert!(errors.iter().any(|e| e.path == "defense.success_probability"));
}

#[test]
fn edge_to_unknown_node_fails_validation() {
    let file = write_scenario(
        "workflow:\n\
         \x20 nodes:\n\
         \x20   - id: a\n\
         \x20     role: AGENT\n\
         \x20     label: Recon Agent\n\
         \x20 edges:\n\
         \x20   - source: a\n\
         \x20     target: ghost\n",
    );
    let err = config::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("validation failed"));
}

#[test]
fn warnings_do_not_block_loading() {
    // An empty exercise name is only a warning.
    let file = write_scenario("exercise:\n  name: \"\"\n");
    assert!(config::load(file.path()).is_ok());
}
