use once_cell::sync::Lazy;
use serde::{self, Deserialize, Serialize};
use std::borrow::Cow;

/// Environment variable holding the path to the TOML configuration file
pub static APP_CONFIG: &str = "VKQUICK_CONFIG";
pub static CONFIG: Lazy<Config> = Lazy::new(Config::new);
/// Configuration file
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

/// Defaults for new [`Api`](crate::Api) clients
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// API version sent as `v`
    #[serde(default = "default_version")]
    pub version: Cow<'static, str>,
    /// Host receiving `/method/` requests
    #[serde(default = "default_host")]
    pub host: Cow<'static, str>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            host: default_host(),
        }
    }
}

fn default_version() -> Cow<'static, str> {
    Cow::Borrowed(crate::api::types::DEFAULT_API_VERSION)
}
fn default_host() -> Cow<'static, str> {
    Cow::Borrowed(crate::api::types::DEFAULT_API_HOST)
}

/// Network configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct NetworkConfig {
    /// Number of retry attempts for failed requests
    #[serde(default = "default_retries")]
    pub retries: usize,
    /// Maximum backoff time in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Pool idle timeout in seconds
    #[serde(default = "default_pool_idle_timeout_secs")]
    pub pool_idle_timeout_secs: u64,
    /// Maximum number of idle connections per host
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            max_backoff_ms: default_max_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            pool_idle_timeout_secs: default_pool_idle_timeout_secs(),
            max_idle_connections: default_max_idle_connections(),
        }
    }
}

fn default_retries() -> usize {
    3
}
fn default_max_backoff_ms() -> u64 {
    5000
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_pool_idle_timeout_secs() -> u64 {
    90
}
fn default_max_idle_connections() -> usize {
    10
}

/// Output format of the fmt layer
#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Json,
}

/// Logging variables
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LogConfig {
    #[serde(default = "default_filter")]
    pub filter: Cow<'static, str>,
    /// Level for this crate's own targets
    #[serde(default = "default_self_directive")]
    pub self_directive: Cow<'static, str>,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_ansi")]
    pub ansi: bool,
    #[serde(default = "default_directives")]
    pub directives: Vec<FmtDirective>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            self_directive: default_self_directive(),
            format: LogFormat::default(),
            ansi: default_ansi(),
            directives: default_directives(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct FmtDirective {
    pub fmt_filter_directive: Cow<'static, str>,
}

fn default_filter() -> Cow<'static, str> {
    Cow::Borrowed("info")
}
fn default_self_directive() -> Cow<'static, str> {
    Cow::Borrowed("debug")
}
fn default_ansi() -> bool {
    true
}
fn default_directives() -> Vec<FmtDirective> {
    vec![
        FmtDirective {
            fmt_filter_directive: Cow::Borrowed("hyper=info"),
        },
        FmtDirective {
            fmt_filter_directive: Cow::Borrowed("reqwest=info"),
        },
    ]
}
