//! Error types
use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::fmt;
use thiserror::Error;

/// Request parameter echoed back by VK inside an error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestParam {
    pub key: String,
    pub value: String,
}

/// Error object returned by the API instead of `response`
///
/// ```json
/// {"error": {"error_code": 5, "error_msg": "User authorization failed", "request_params": [...]}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub error_code: i64,
    pub error_msg: String,
    #[serde(default)]
    pub request_params: Vec<RequestParam>,
}

impl ApiError {
    /// Value of the echoed request parameter `key`, if VK sent it back
    pub fn param(&self, key: &str) -> Option<&str> {
        self.request_params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Method name echoed in `request_params`
    pub fn method(&self) -> Option<&str> {
        self.param("method")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code, self.error_msg)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Error)]
pub enum VkError {
    /// API Error
    #[error("API Error: {0}")]
    Api(#[from] ApiError),
    /// Network Error
    #[error("Network Error: {0}")]
    Network(#[from] reqwest::Error),
    /// Serialization/Deserialization Error
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL Error
    #[error("URL Error: {0}")]
    Url(#[from] url::ParseError),
    /// File System Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration Error
    #[error("Config Error: {0}")]
    Config(String),
    /// Validation Error
    #[error("Validation Error: {0}")]
    Validation(String),
    /// System Error
    #[error("System Error: {0}")]
    System(String),
}

impl From<toml::de::Error> for VkError {
    fn from(err: toml::de::Error) -> Self {
        VkError::Config(err.to_string())
    }
}

impl From<VarError> for VkError {
    fn from(err: VarError) -> Self {
        VkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VkError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_error() -> ApiError {
        serde_json::from_str(
            r#"{
                "error_code": 5,
                "error_msg": "User authorization failed: invalid access_token (4).",
                "request_params": [
                    {"key": "method", "value": "users.get"},
                    {"key": "oauth", "value": "1"},
                    {"key": "v", "value": "5.133"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_api_error_display() {
        let err = auth_error();
        assert_eq!(
            err.to_string(),
            "[5] User authorization failed: invalid access_token (4)."
        );
        let wrapped = VkError::from(err);
        assert!(wrapped.to_string().starts_with("API Error: [5]"));
    }

    #[test]
    fn test_api_error_params() {
        let err = auth_error();
        assert_eq!(err.method(), Some("users.get"));
        assert_eq!(err.param("v"), Some("5.133"));
        assert_eq!(err.param("peer_id"), None);
    }

    #[test]
    fn test_api_error_without_request_params() {
        let err: ApiError =
            serde_json::from_str(r#"{"error_code": 6, "error_msg": "Too many requests per second"}"#)
                .unwrap();
        assert!(err.request_params.is_empty());
        assert_eq!(err.method(), None);
    }

    #[test]
    fn test_config_error_conversions() {
        let err = VkError::from(VarError::NotPresent);
        assert!(matches!(err, VkError::Config(_)));

        let toml_err = toml::from_str::<toml::Table>("invalid [[[").unwrap_err();
        let err = VkError::from(toml_err);
        assert!(matches!(err, VkError::Config(_)));
    }

    #[test]
    fn test_error_source() {
        use std::error::Error as _;
        let err = VkError::from(auth_error());
        assert!(err.source().is_some());
        let err = VkError::Validation("bad".to_string());
        assert!(err.source().is_none());
    }
}
