use serial_test::serial;
use std::fs;
use strata_data::config::{ConfigError, StrataConfig};
use strata_data::{CursorRequest, OffsetRequest};
use tempfile::TempDir;

/// Removes the listed variables on drop so tests leave the process
/// environment as they found it.
struct EnvGuard(Vec<&'static str>);

impl EnvGuard {
    fn set(pairs: &[(&'static str, &str)]) -> Self {
        for (key, value) in pairs {
            std::env::set_var(key, value);
        }
        EnvGuard(pairs.iter().map(|(k, _)| *k).collect())
    }

    fn clearing(keys: &[&'static str]) -> Self {
        EnvGuard(keys.to_vec())
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.0 {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_defaults_from_empty_yaml() {
    let config = StrataConfig::from_yaml_str("").unwrap();
    assert_eq!(config, StrataConfig::default());
    assert_eq!(config.pagination.default_limit, 10);
    assert_eq!(config.pagination.max_limit, 500);
    assert_eq!(config.database.url, "sqlite::memory:");
    assert_eq!(config.database.max_connections, 5);
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let yaml = r#"
pagination:
  max_limit: 50
database:
  url: "postgres://localhost/strata"
"#;
    let config = StrataConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.pagination.default_limit, 10);
    assert_eq!(config.pagination.max_limit, 50);
    assert_eq!(config.database.url, "postgres://localhost/strata");
    assert_eq!(config.database.max_connections, 5);
}

#[test]
fn test_validation_collects_every_problem() {
    let yaml = r#"
pagination:
  default_limit: 0
database:
  max_connections: 0
"#;
    let err = StrataConfig::from_yaml_str(yaml).unwrap_err();
    let details = match err {
        ConfigError::Validation(details) => details,
        other => panic!("expected validation error, got {other}"),
    };
    let keys: Vec<&str> = details.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, vec!["pagination.default_limit", "database.max_connections"]);
}

#[test]
fn test_max_below_default_rejected() {
    let yaml = "pagination: {default_limit: 20, max_limit: 5}";
    assert!(matches!(
        StrataConfig::from_yaml_str(yaml),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_wrong_shape_is_deserialize_error() {
    let yaml = "pagination: {max_limit: lots}";
    assert!(matches!(
        StrataConfig::from_yaml_str(yaml),
        Err(ConfigError::Deserialize(_))
    ));
    assert!(matches!(
        StrataConfig::from_yaml_str("pagination: [unclosed"),
        Err(ConfigError::Load(_))
    ));
}

#[test]
#[serial]
fn test_profile_file_overrides_base() {
    let _env = EnvGuard::clearing(&["STRATA_PROFILE"]);
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("application.yaml"),
        "pagination:\n  default_limit: 15\n  max_limit: 100\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join("application-test.yaml"),
        "pagination:\n  max_limit: 30\n",
    )
    .unwrap();

    let config = StrataConfig::load_from_dir(tmp.path(), "test").unwrap();
    assert_eq!(config.pagination.default_limit, 15);
    assert_eq!(config.pagination.max_limit, 30);

    let config = StrataConfig::load_from_dir(tmp.path(), "prod").unwrap();
    assert_eq!(config.pagination.max_limit, 100);
}

#[test]
#[serial]
fn test_env_overrides_yaml() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("application.yaml"),
        "database:\n  url: \"sqlite://from-yaml.db\"\n  max_connections: 2\n",
    )
    .unwrap();
    let _env = EnvGuard::set(&[
        ("STRATA_DATABASE__URL", "sqlite://from-env.db"),
        ("STRATA_PAGINATION__MAX_LIMIT", "40"),
    ]);

    let config = StrataConfig::load_from_dir(tmp.path(), "dev").unwrap();
    assert_eq!(config.database.url, "sqlite://from-env.db");
    assert_eq!(config.database.max_connections, 2);
    assert_eq!(config.pagination.max_limit, 40);
}

#[test]
#[serial]
fn test_profile_env_var_wins_over_argument() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("application-staging.yaml"),
        "pagination:\n  max_limit: 77\n",
    )
    .unwrap();
    let _env = EnvGuard::set(&[("STRATA_PROFILE", "staging")]);

    let config = StrataConfig::load_from_dir(tmp.path(), "dev").unwrap();
    assert_eq!(config.pagination.max_limit, 77);
}

#[test]
#[serial]
fn test_dotenv_file_feeds_overlay() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".env"),
        "STRATA_DATABASE__MAX_CONNECTIONS=9\n",
    )
    .unwrap();
    let _env = EnvGuard::clearing(&["STRATA_DATABASE__MAX_CONNECTIONS", "STRATA_PROFILE"]);

    let config = StrataConfig::load_from_dir(tmp.path(), "dev").unwrap();
    assert_eq!(config.database.max_connections, 9);
}

#[test]
fn test_requests_normalized_against_limits() {
    let config = StrataConfig::from_yaml_str("pagination: {default_limit: 5, max_limit: 50}").unwrap();
    let pagination = &config.pagination;

    assert_eq!(
        pagination.normalize_cursor(CursorRequest::new(3, 0)),
        CursorRequest::new(3, 5)
    );
    assert_eq!(
        pagination.normalize_cursor(CursorRequest::new(0, 1_000)),
        CursorRequest::new(0, 50)
    );
    assert_eq!(
        pagination.normalize_offset(OffsetRequest::new(1, 80)),
        OffsetRequest::new(1, 50)
    );
}
