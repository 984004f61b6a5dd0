//! Unit tests for configuration parsing.

use rstest::rstest;
use serde::Deserialize;
use serde::de::value::{Error as DeError, MapDeserializer};

use super::*;

#[rstest]
#[case::lower("json", LogFormat::Json)]
#[case::upper("COMPACT", LogFormat::Compact)]
#[case::mixed("Compact", LogFormat::Compact)]
fn log_format_parses_case_insensitively(#[case] text: &str, #[case] expected: LogFormat) {
    assert_eq!(text.parse::<LogFormat>().expect("parse"), expected);
}

#[test]
fn log_format_rejects_unknown_names() {
    assert!("pretty".parse::<LogFormat>().is_err());
}

#[test]
fn default_matches_the_documented_values() {
    let config = Config::default();
    assert_eq!(config.constants_path(), None);
    assert_eq!(config.scenario_dir(), Utf8Path::new(DEFAULT_SCENARIO_DIR));
    assert_eq!(config.log_filter(), "info");
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[test]
fn serde_fills_missing_fields_with_defaults() {
    let empty = MapDeserializer::<std::iter::Empty<(&str, &str)>, DeError>::new(std::iter::empty());
    let config = Config::deserialize(empty).expect("defaults deserialize");
    assert_eq!(config, Config::default());
}

#[test]
fn blank_log_filter_is_rejected() {
    let config = Config {
        log_filter: "  ".to_owned(),
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::EmptyLogFilter)));
}

#[rstest]
#[case::scenario_dir(Config { scenario_dir: Utf8PathBuf::new(), ..Config::default() }, "--scenario-dir")]
#[case::constants_path(
    Config { constants_path: Some(Utf8PathBuf::new()), ..Config::default() },
    "--constants-path"
)]
fn blank_paths_are_rejected(#[case] config: Config, #[case] expected: &str) {
    let error = config.validate().expect_err("blank path");
    assert!(matches!(error, ConfigError::EmptyPath { setting } if setting == expected));
    assert_eq!(error.to_string(), format!("{expected} must not be an empty path"));
}
