use std::fs;

use assert_matches::assert_matches;

use marine_records_fetcher::config::{Config, ConfigLoader, PASSWORD_ENV, USERNAME_ENV};
use marine_records_fetcher::error::MrfError;

#[test]
fn parse_config_file() {
    let raw = r#"{
        "schema_version": 1,
        "cmems": { "username": "alice", "password": "secret", "timeout_secs": 30 },
        "gbif": { "base_url": "http://localhost:8080/v1/" }
    }"#;
    let config: Config = serde_json::from_str(raw).unwrap();
    let resolved = ConfigLoader::resolve_config(config, |_| None);

    let credentials = resolved.cmems.credentials.unwrap();
    assert_eq!(credentials.username, "alice");
    assert_eq!(credentials.password, "secret");
    assert_eq!(resolved.cmems.timeout.as_secs(), 30);
    assert_eq!(resolved.gbif.base_url, "http://localhost:8080/v1");
}

#[test]
fn credentials_from_environment_only() {
    let resolved = ConfigLoader::resolve_config(Config::default(), |key| match key {
        USERNAME_ENV => Some("bob".to_string()),
        PASSWORD_ENV => Some("hunter2".to_string()),
        _ => None,
    });
    assert_eq!(resolved.cmems.credentials.unwrap().username, "bob");
}

#[test]
fn incomplete_credentials_resolve_to_none() {
    let resolved = ConfigLoader::resolve_config(Config::default(), |key| match key {
        USERNAME_ENV => Some("bob".to_string()),
        _ => None,
    });
    assert!(resolved.cmems.credentials.is_none());
}

#[test]
fn explicit_missing_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, MrfError::MissingConfig(_));
}

#[test]
fn explicit_invalid_config_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("mrf.json");
    fs::write(&path, "{ not json").unwrap();
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, MrfError::ConfigParse(_));
}
