#![allow(unsafe_code)]

//! Tests touching process environment variables
//! These tests are separated to avoid conflicts with the forbid(unsafe_code) directive

use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;
use vkquick::config::{Config, LogFormat, get_config, types::APP_CONFIG};
use vkquick::error::VkError;
use vkquick::prelude::{Api, VKQUICK_TOKEN};

// Helper functions for environment variable manipulation in tests
fn remove_env_var(key: &str) {
    unsafe {
        std::env::remove_var(key);
    }
}

fn set_env_var(key: &str, value: &str) {
    unsafe {
        std::env::set_var(key, value);
    }
}

#[test]
#[serial]
fn test_config_new_fallback_to_default() {
    remove_env_var(APP_CONFIG);

    let config = Config::new();

    assert_eq!(config.network.retries, 3);
    assert_eq!(config.network.max_backoff_ms, 5000);
    assert_eq!(config.api.version, "5.133");
    assert_eq!(config.api.host, "api.vk.com");
}

#[test]
#[serial]
fn test_get_config_missing_env_var() {
    remove_env_var(APP_CONFIG);

    let result = get_config();
    assert!(matches!(result, Err(VkError::Config(_))));
}

#[test]
#[serial]
fn test_get_config_missing_file() {
    set_env_var(APP_CONFIG, "/path/that/does/not/exist/config.toml");

    let result = get_config();
    assert!(matches!(result, Err(VkError::Io(_))));

    remove_env_var(APP_CONFIG);
}

#[test]
#[serial]
fn test_get_config_invalid_toml() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "invalid toml content [[[").unwrap();

    set_env_var(APP_CONFIG, &temp_file.path().to_string_lossy());

    let result = get_config();
    assert!(matches!(result, Err(VkError::Config(_))));
    // Config::new swallows the error
    assert_eq!(Config::new(), Config::default());

    remove_env_var(APP_CONFIG);
}

#[test]
#[serial]
fn test_get_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(
        temp_file,
        r#"
[api]
version = "5.199"
host = "api.vk.ru"

[network]
retries = 1
request_timeout_secs = 5

[logging]
filter = "warn"
format = "full"
"#
    )
    .unwrap();

    set_env_var(APP_CONFIG, &temp_file.path().to_string_lossy());

    let config = get_config().unwrap();
    assert_eq!(config.api.version, "5.199");
    assert_eq!(config.api.host, "api.vk.ru");
    assert_eq!(config.network.retries, 1);
    assert_eq!(config.network.request_timeout_secs, 5);
    assert_eq!(config.network.connect_timeout_secs, 10);
    assert_eq!(config.logging.filter, "warn");
    assert_eq!(config.logging.format, LogFormat::Full);

    remove_env_var(APP_CONFIG);
}

#[tokio::test]
#[serial]
async fn test_api_from_env_missing_token() {
    remove_env_var(VKQUICK_TOKEN);

    let result = Api::from_env().await;
    assert!(matches!(result, Err(VkError::Config(_))));
}
