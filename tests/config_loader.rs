//! Layered configuration: defaults, YAML file, then environment overrides.

use std::io::Write;

use reportloop::domain::models::{DriverKind, OracleProvider};
use reportloop::ConfigLoader;

fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write yaml");
    file
}

#[test]
fn test_file_values_override_defaults() {
    let file = yaml_file(
        r"
engine:
  verification_rounds: 3
  driver: loop
oracle:
  model: gpt-5
logging:
  level: debug
  format: json
",
    );

    temp_env::with_vars_unset(
        ["REPORTLOOP_ENGINE__VERIFICATION_ROUNDS", "REPORTLOOP_ORACLE__MODEL"],
        || {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();
            assert_eq!(config.engine.verification_rounds, 3);
            assert_eq!(config.engine.driver, DriverKind::Loop);
            assert_eq!(config.oracle.model, "gpt-5");
            assert_eq!(config.logging.level, "debug");
            assert!(config.engine.include_sample_report);
        },
    );
}

#[test]
fn test_environment_overrides_file() {
    let file = yaml_file("engine:\n  verification_rounds: 3\n");

    temp_env::with_vars(
        [
            ("REPORTLOOP_ENGINE__VERIFICATION_ROUNDS", Some("2")),
            ("REPORTLOOP_ORACLE__PROVIDER", Some("mock")),
        ],
        || {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();
            assert_eq!(config.engine.verification_rounds, 2);
            assert_eq!(config.oracle.provider, OracleProvider::Mock);
        },
    );
}

#[test]
fn test_out_of_range_rounds_are_rejected() {
    let file = yaml_file("engine:\n  verification_rounds: 9\n");

    temp_env::with_vars_unset(["REPORTLOOP_ENGINE__VERIFICATION_ROUNDS"], || {
        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Must be between 1 and 5"));
    });
}

#[test]
fn test_azure_without_endpoint_is_rejected() {
    let file = yaml_file("oracle:\n  provider: azure\n");

    temp_env::with_vars_unset(["REPORTLOOP_ORACLE__PROVIDER"], || {
        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("azure_endpoint"));
    });
}

#[test]
fn test_malformed_yaml_reports_the_path() {
    let file = yaml_file("engine: [unclosed\n");

    let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to load config from"));
}
