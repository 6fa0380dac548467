//! Tests for config functionality.

use crate::config::Config;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.policy_id, "deny-excluded-users");
    assert_eq!(config.lock_max_attempts, 10);
    assert_eq!(config.lock_backoff_min_ms, 500);
    assert_eq!(config.lock_backoff_max_ms, 1500);
    assert_eq!(config.lock_stale_minutes, 15);
    assert_eq!(config.mutation_max_attempts, 5);
    assert_eq!(config.mutation_backoff_base_ms, 100);
    assert_eq!(config.mutation_backoff_max_ms, 2000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
identity_store_id: d-9876543210
lock_max_attempts: 3
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.identity_store_id, "d-9876543210");
    assert_eq!(config.lock_max_attempts, 3);

    // Unspecified values should use defaults
    assert_eq!(config.policy_id, "deny-excluded-users");
    assert_eq!(config.lock_backoff_max_ms, 1500);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
identity_store_id: d-1111111111
policy_id: offboarding
policy_name: Offboarding
policy_description: "Blocks departed staff"
lock_max_attempts: 4
lock_backoff_min_ms: 10
lock_backoff_max_ms: 20
lock_stale_minutes: 30
mutation_max_attempts: 8
mutation_backoff_base_ms: 50
mutation_backoff_max_ms: 400
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.identity_store_id, "d-1111111111");
    assert_eq!(config.policy_id, "offboarding");
    assert_eq!(config.policy_name, "Offboarding");
    assert_eq!(config.policy_description, "Blocks departed staff");
    assert_eq!(config.lock_max_attempts, 4);
    assert_eq!(config.lock_backoff_min_ms, 10);
    assert_eq!(config.lock_backoff_max_ms, 20);
    assert_eq!(config.lock_stale_minutes, 30);
    assert_eq!(config.mutation_max_attempts, 8);
    assert_eq!(config.mutation_backoff_base_ms, 50);
    assert_eq!(config.mutation_backoff_max_ms, 400);
}

#[test]
fn test_parse_yaml_with_unknown_fields() {
    // Unknown fields should be silently ignored for forward compatibility
    let yaml = r#"
lock_max_attempts: 2
unknown_field: "some value"
another_unknown:
  nested: true
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.lock_max_attempts, 2);
    assert_eq!(config.policy_name, "DenyExcludedUsers");
}

#[test]
fn test_validate_zero_lock_max_attempts() {
    let err = Config::from_yaml("lock_max_attempts: 0").unwrap_err();

    assert!(err.to_string().contains("lock_max_attempts"));
    assert!(err.to_string().contains("greater than 0"));
}

#[test]
fn test_validate_zero_mutation_max_attempts() {
    let err = Config::from_yaml("mutation_max_attempts: 0").unwrap_err();
    assert!(err.to_string().contains("mutation_max_attempts"));
}

#[test]
fn test_validate_zero_lock_stale_minutes() {
    let err = Config::from_yaml("lock_stale_minutes: 0").unwrap_err();
    assert!(err.to_string().contains("lock_stale_minutes"));
}

#[test]
fn test_validate_backoff_bounds_must_be_ordered() {
    let yaml = r#"
lock_backoff_min_ms: 900
lock_backoff_max_ms: 900
"#;
    let err = Config::from_yaml(yaml).unwrap_err();

    assert!(err.to_string().contains("lock_backoff_min_ms (900)"));
    assert!(err.to_string().contains("lock_backoff_max_ms (900)"));
}

#[test]
fn test_validate_policy_id_must_be_filename_safe() {
    for bad in ["\"\"", "../escape", "has space", "a/b"] {
        let yaml = format!("policy_id: {}", bad);
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(
            err.to_string().contains("policy_id"),
            "expected rejection of {}",
            bad
        );
    }

    assert!(Config::from_yaml("policy_id: Deny_Users-2").is_ok());
}

#[test]
fn test_lock_settings_from_config() {
    let config = Config::from_yaml("lock_max_attempts: 3\nlock_backoff_min_ms: 5\nlock_backoff_max_ms: 7")
        .unwrap();
    let settings = config.lock_settings();

    assert_eq!(settings.max_attempts, 3);
    assert_eq!(settings.backoff_min, Duration::from_millis(5));
    assert_eq!(settings.backoff_max, Duration::from_millis(7));
}

#[test]
fn test_retry_policy_from_config() {
    let policy = Config::default().retry_policy();

    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.base_delay, Duration::from_millis(100));
    assert_eq!(policy.max_delay, Duration::from_secs(2));
}

#[test]
fn test_to_yaml() {
    let config = Config {
        policy_id: "custom".to_string(),
        ..Config::default()
    };
    let yaml = config.to_yaml().unwrap();

    // Should be valid YAML that can be parsed back
    let parsed = Config::from_yaml(&yaml).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_config_load_from_file() {
    use std::io::Write;
    use tempfile::NamedTempFile;

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "identity_store_id: d-42").unwrap();
    writeln!(file, "lock_stale_minutes: 60").unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.identity_store_id, "d-42");
    assert_eq!(config.lock_stale_minutes, 60);
}

#[test]
fn test_config_load_missing_file() {
    let err = Config::load("/nonexistent/path/config.yaml").unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}
