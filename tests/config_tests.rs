// Config loading and validation tests

use fleetmon::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[api]
base_url = "https://metrics.example.com"
subscription_id = "sub-0000"
resource_group = "rg-test"

[collection]
node_name = "virtual-node-1"
"#;

const VALID_CONFIG_FULL: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[api]
base_url = "https://metrics.example.com"
subscription_id = "sub-0000"
resource_group = "rg-test"
token_env = "METRICS_TOKEN"

[retry]
wait_min_ms = 500
wait_max_ms = 10000
max_attempts = 6

[collection]
node_name = "virtual-node-1"
validity_window_secs = 30
max_concurrent_fetches = 5
poll_interval_secs = 15
stats_log_interval_secs = 120
"#;

#[test]
fn test_config_loads_with_defaults() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.api.subscription_id, "sub-0000");
    assert_eq!(config.api.token_env, "FLEETMON_API_TOKEN");
    assert_eq!(config.retry.wait_min_ms, 1000);
    assert_eq!(config.retry.wait_max_ms, 30_000);
    assert_eq!(config.retry.max_attempts, 4);
    assert_eq!(config.collection.node_name, "virtual-node-1");
    assert_eq!(config.collection.validity_window_secs, 60);
    assert_eq!(config.collection.max_concurrent_fetches, 10);
    assert_eq!(config.collection.poll_interval_secs, 60);
    assert_eq!(config.collection.stats_log_interval_secs, 300);
}

#[test]
fn test_config_loads_explicit_values() {
    let config = AppConfig::load_from_str(VALID_CONFIG_FULL).expect("load_from_str");
    assert_eq!(config.api.token_env, "METRICS_TOKEN");
    assert_eq!(config.retry.wait_min_ms, 500);
    assert_eq!(config.retry.wait_max_ms, 10_000);
    assert_eq!(config.retry.max_attempts, 6);
    assert_eq!(config.collection.validity_window_secs, 30);
    assert_eq!(config.collection.max_concurrent_fetches, 5);
    assert_eq!(config.collection.poll_interval_secs, 15);
    assert_eq!(config.collection.stats_log_interval_secs, 120);
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_unparseable_base_url() {
    let bad = VALID_CONFIG.replace(
        "base_url = \"https://metrics.example.com\"",
        "base_url = \"not a url\"",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("api.base_url"));
}

#[test]
fn test_config_validation_rejects_empty_subscription_id() {
    let bad = VALID_CONFIG.replace("subscription_id = \"sub-0000\"", "subscription_id = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("api.subscription_id"));
}

#[test]
fn test_config_validation_rejects_empty_resource_group() {
    let bad = VALID_CONFIG.replace("resource_group = \"rg-test\"", "resource_group = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("api.resource_group"));
}

#[test]
fn test_config_validation_rejects_empty_node_name() {
    let bad = VALID_CONFIG.replace("node_name = \"virtual-node-1\"", "node_name = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("collection.node_name"));
}

#[test]
fn test_config_validation_rejects_wait_min_zero() {
    let bad = VALID_CONFIG_FULL.replace("wait_min_ms = 500", "wait_min_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("retry.wait_min_ms"));
}

#[test]
fn test_config_validation_rejects_wait_min_above_wait_max() {
    let bad = VALID_CONFIG_FULL.replace("wait_min_ms = 500", "wait_min_ms = 60000");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("wait_min_ms must be <="));
}

#[test]
fn test_config_validation_rejects_max_attempts_zero() {
    let bad = VALID_CONFIG_FULL.replace("max_attempts = 6", "max_attempts = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("retry.max_attempts"));
}

#[test]
fn test_config_validation_rejects_validity_window_zero() {
    let bad = VALID_CONFIG_FULL.replace("validity_window_secs = 30", "validity_window_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("collection.validity_window_secs"));
}

#[test]
fn test_config_validation_rejects_max_concurrent_fetches_zero() {
    let bad =
        VALID_CONFIG_FULL.replace("max_concurrent_fetches = 5", "max_concurrent_fetches = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("collection.max_concurrent_fetches"));
}

#[test]
fn test_config_validation_rejects_poll_interval_zero() {
    let bad = VALID_CONFIG_FULL.replace("poll_interval_secs = 15", "poll_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("collection.poll_interval_secs"));
}

#[test]
fn test_config_validation_rejects_stats_log_interval_zero() {
    let bad = VALID_CONFIG_FULL.replace(
        "stats_log_interval_secs = 120",
        "stats_log_interval_secs = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("collection.stats_log_interval_secs"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.api.base_url, "https://metrics.example.com");
}

#[test]
fn test_retry_policy_conversion() {
    let config = AppConfig::load_from_str(VALID_CONFIG_FULL).expect("valid");
    let policy = config.retry_policy();
    assert_eq!(policy.wait_min, std::time::Duration::from_millis(500));
    assert_eq!(policy.wait_max, std::time::Duration::from_millis(10_000));
    assert_eq!(policy.max_attempts, 6);
}

#[test]
fn test_collector_config_conversion() {
    let config = AppConfig::load_from_str(VALID_CONFIG_FULL).expect("valid");
    let collector = config.collector_config();
    assert_eq!(collector.node_name, "virtual-node-1");
    assert_eq!(
        collector.validity_window,
        std::time::Duration::from_secs(30)
    );
    assert_eq!(collector.max_concurrent_fetches, 5);
}
