//! Settings layering, precedence, and parse-error tests.

use std::collections::HashMap;
use std::fs;

use assert_fs::prelude::*;
use recruiter_core::{
    config::{self, DEFAULT_API_VERSION},
    ConfigError,
};
use rstest::rstest;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

// ---------------------------------------------------------------------------
// 1. File layers
// ---------------------------------------------------------------------------

#[test]
fn base_file_is_loaded() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("recruiter.yaml")
        .write_str("azure_ai:\n  endpoint: https://base.example.com\n  agent_id: asst_base\n")
        .unwrap();

    let settings = config::load_at(dir.path(), None, &env(&[])).expect("load");
    assert_eq!(settings.azure_ai.endpoint, "https://base.example.com");
    assert_eq!(settings.azure_ai.agent_id, "asst_base");
    assert_eq!(settings.azure_ai.api_version, DEFAULT_API_VERSION);
    settings.azure_ai.validate().expect("complete settings validate");
}

#[test]
fn environment_file_overrides_single_fields() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("recruiter.yaml")
        .write_str("azure_ai:\n  endpoint: https://base.example.com\n  agent_id: asst_base\n")
        .unwrap();
    dir.child("recruiter.staging.yaml")
        .write_str("azure_ai:\n  agent_id: asst_staging\n")
        .unwrap();

    let settings = config::load_at(
        dir.path(),
        None,
        &env(&[("RECRUITER_ENVIRONMENT", "staging")]),
    )
    .expect("load");
    assert_eq!(settings.azure_ai.endpoint, "https://base.example.com");
    assert_eq!(settings.azure_ai.agent_id, "asst_staging");
}

#[test]
fn development_is_the_default_environment() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("recruiter.development.yaml")
        .write_str("azure_ai:\n  agent_id: asst_dev\n")
        .unwrap();

    let settings = config::load_at(dir.path(), None, &env(&[])).expect("load");
    assert_eq!(settings.azure_ai.agent_id, "asst_dev");
}

#[test]
fn secrets_file_in_home_supplies_token() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let home = assert_fs::TempDir::new().expect("home");
    home.child(".recruiter/secrets.yaml")
        .write_str("azure_ai:\n  token: from-secrets\n")
        .unwrap();

    let settings = config::load_at(dir.path(), Some(home.path()), &env(&[])).expect("load");
    assert_eq!(settings.azure_ai.require_token().unwrap(), "from-secrets");
}

#[test]
fn environment_variables_win_over_files() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("recruiter.yaml")
        .write_str("azure_ai:\n  endpoint: https://file.example.com\n  poll_interval_ms: 900\n")
        .unwrap();

    let settings = config::load_at(
        dir.path(),
        None,
        &env(&[
            ("RECRUITER_AZURE_AI__ENDPOINT", "https://env.example.com"),
            ("RECRUITER_AZURE_AI__POLL_INTERVAL_MS", "50"),
        ]),
    )
    .expect("load");
    assert_eq!(settings.azure_ai.endpoint, "https://env.example.com");
    assert_eq!(settings.azure_ai.poll_interval_ms, 50);
}

#[test]
fn secrets_file_wins_over_environment_variables() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let home = assert_fs::TempDir::new().expect("home");
    home.child(".recruiter/secrets.yaml")
        .write_str("azure_ai:\n  token: from-secrets\n")
        .unwrap();

    let settings = config::load_at(
        dir.path(),
        Some(home.path()),
        &env(&[
            ("RECRUITER_AZURE_AI__TOKEN", "from-env"),
            ("RECRUITER_AZURE_AI__AGENT_ID", "asst_env"),
        ]),
    )
    .expect("load");
    assert_eq!(settings.azure_ai.token.as_deref(), Some("from-secrets"));
    assert_eq!(settings.azure_ai.agent_id, "asst_env");
}

#[test]
fn empty_file_is_an_empty_layer() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("recruiter.yaml").write_str("\n").unwrap();
    config::load_at(dir.path(), None, &env(&[])).expect("empty file loads");
}

// ---------------------------------------------------------------------------
// 2. Errors
// ---------------------------------------------------------------------------

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("recruiter.yaml"),
        b": : corrupt : yaml : !!!\n  - broken: [unclosed",
    )
    .expect("write");

    let err = config::load_at(dir.path(), None, &env(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("recruiter.yaml"));
}

#[rstest]
#[case::missing_endpoint("azure_ai:\n  agent_id: asst_1\n", "azure_ai.endpoint")]
#[case::missing_agent("azure_ai:\n  endpoint: https://x.example.com\n", "azure_ai.agent_id")]
#[case::relative_endpoint("azure_ai:\n  endpoint: /api/projects\n  agent_id: asst_1\n", "valid absolute URL")]
fn validation_failures_name_the_offending_key(#[case] yaml: &str, #[case] needle: &str) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("recruiter.yaml").write_str(yaml).unwrap();

    let settings = config::load_at(dir.path(), None, &env(&[])).expect("load");
    let err = settings.azure_ai.validate().unwrap_err();
    assert!(
        err.to_string().contains(needle),
        "expected '{needle}' in: {err}"
    );
}
