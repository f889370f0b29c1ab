//! Subscriber setup for the `tracing` events emitted by this crate
use crate::config::{CONFIG, LogConfig, LogFormat};
use crate::error::{Result, VkError};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Target prefix of this crate's events
pub const SERVICE_TARGET: &str = "vkquick";

/// Filter built from `cfg`. `RUST_LOG` replaces the configured base filter
pub fn fmt_filter(cfg: &LogConfig) -> Result<EnvFilter> {
    let base = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| cfg.filter.to_string());

    let mut filter = EnvFilter::try_new(&base).map_err(|e| VkError::Config(e.to_string()))?;
    for fmt in &cfg.directives {
        filter = filter.add_directive(parse_directive(&fmt.fmt_filter_directive)?);
    }
    filter = filter.add_directive(parse_directive(&format!(
        "{}={}",
        SERVICE_TARGET, cfg.self_directive
    ))?);

    Ok(filter)
}

fn parse_directive(directive: &str) -> Result<tracing_subscriber::filter::Directive> {
    directive
        .parse()
        .map_err(|e| VkError::Config(format!("Invalid log directive `{directive}`: {e}")))
}

/// Install the global subscriber described by [`CONFIG`]
///
/// ## Errors
/// - `VkError::Config` - a filter directive can't be parsed
/// - `VkError::System` - a global subscriber is already installed
pub fn init() -> Result<()> {
    init_with(&CONFIG.logging)
}

/// Install the global subscriber described by `cfg`
pub fn init_with(cfg: &LogConfig) -> Result<()> {
    let registry = tracing_subscriber::registry();

    let layer = match cfg.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(fmt_filter(cfg)?)
            .boxed(),
        LogFormat::Full => tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(cfg.ansi)
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_filter(fmt_filter(cfg)?)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(cfg.ansi)
            .with_writer(std::io::stderr)
            .with_filter(fmt_filter(cfg)?)
            .boxed(),
    };

    registry
        .with(layer)
        .try_init()
        .map_err(|e| VkError::System(format!("Failed to install subscriber: {e}")))
}
