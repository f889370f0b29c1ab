pub mod types;
use crate::error::Result;
use types::APP_CONFIG;
pub use types::{ApiConfig, CONFIG, Config, FmtDirective, LogConfig, LogFormat, NetworkConfig};

impl Config {
    pub fn new() -> Self {
        // Path to the file comes from VKQUICK_CONFIG
        get_config().unwrap_or_default()
    }
}

/// Read and parse the file named by `VKQUICK_CONFIG`
///
/// ## Errors
/// - `VkError::Config` - variable is not set or the file is not valid TOML
/// - `VkError::Io` - file can't be read
pub fn get_config() -> Result<Config> {
    let path = std::env::var(APP_CONFIG)?;
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str::<Config>(&content)?)
}
