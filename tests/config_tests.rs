//! Loading client and view configuration from files

use std::io::Write;

use tablekit_sdk::{ApiError, ClientConfig, ViewConfig};
use tempfile::NamedTempFile;

#[test]
fn test_client_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
base_url = "https://tables.example.com/api/v1/"
api_key = "sk_live_123"
timeout_seconds = 5
"#
    )
    .unwrap();

    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.api_key.as_deref(), Some("sk_live_123"));
    assert_eq!(config.timeout_seconds, 5);
    assert_eq!(config.normalized_base_url(), "https://tables.example.com/api/v1");
    assert!(config.user_agent.starts_with("tablekit-sdk/"));
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ClientConfig::from_file(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ApiError::Config(_))));
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "base_url = ").unwrap();
    let result = ClientConfig::from_file(file.path());
    assert!(matches!(result, Err(ApiError::Config(_))));
}

#[test]
fn test_view_config_round_trip_through_toml() {
    let config = ViewConfig::default()
        .with_page_size(50)
        .with_search_debounce_ms(150);
    let text = toml::to_string(&config).unwrap();
    let parsed: ViewConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_client_config_builder() {
    let config = ClientConfig::new("http://localhost:8000/api/v1")
        .with_api_key("sk_1")
        .with_timeout(3)
        .with_user_agent("dashboard/1.0");
    assert_eq!(config.timeout_seconds, 3);
    assert_eq!(config.user_agent, "dashboard/1.0");
}
