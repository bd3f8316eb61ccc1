//! Logging initialization
//!
//! - Respects the RUST_LOG environment variable (it always wins)
//! - Falls back to the filter from [`LoggingConfig`](crate::config::LoggingConfig)
//! - Defaults to "info"
//! - Disables ANSI colors when `NO_COLOR` is set to any non-empty value
//! - `MODGRAPH_LOG_JSON` forces JSON output (with the json-logging feature)
//!
//! # Usage
//! ```no_run
//! use modgraph::utils::init_logging;
//!
//! init_logging(None); // Uses RUST_LOG or defaults to "info"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::{env_bool, env_opt};

/// Environment flag that forces JSON output
pub const LOG_JSON_ENV_VAR: &str = "MODGRAPH_LOG_JSON";

/// Colors stay on unless `NO_COLOR` holds a non-empty value
fn ansi_enabled() -> bool {
    env_opt("NO_COLOR").map_or(true, |v| v.is_empty())
}

/// Pick the filter: RUST_LOG, then the configured filter, then "info"
fn resolve_filter(filter: Option<&str>) -> EnvFilter {
    if env_opt("RUST_LOG").is_some() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::new(filter.unwrap_or("info"))
}

/// Initialize human-readable logging on stderr
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(ansi_enabled()),
        )
        .with(resolve_filter(filter))
        .try_init();
}

/// Initialize logging with JSON output (for log aggregation)
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(resolve_filter(filter))
        .try_init();
}

/// Initialize logging from [`LoggingConfig`](crate::config::LoggingConfig)
///
/// # Example
/// ```no_run
/// use modgraph::config::ResolverConfig;
/// use modgraph::utils::init_logging_from_config;
///
/// let config = ResolverConfig::default();
/// init_logging_from_config(config.logging.as_ref());
/// ```
pub fn init_logging_from_config(config: Option<&crate::config::LoggingConfig>) {
    let filter = config.and_then(|c| c.filter.as_deref());

    let json = env_bool(LOG_JSON_ENV_VAR) || config.map(|c| c.json_format).unwrap_or(false);

    if json {
        #[cfg(feature = "json-logging")]
        {
            init_json_logging(filter);
        }
        #[cfg(not(feature = "json-logging"))]
        {
            // JSON output needs the json-logging feature
            init_logging(filter);
        }
    } else {
        init_logging(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_no_color_disables_ansi_for_any_non_empty_value() {
        for value in ["1", "true", "0", "false", "anything"] {
            std::env::set_var("NO_COLOR", value);
            assert!(!ansi_enabled(), "NO_COLOR={:?} should disable colors", value);
        }

        std::env::set_var("NO_COLOR", "");
        assert!(ansi_enabled());
        std::env::remove_var("NO_COLOR");
        assert!(ansi_enabled());
    }

    #[test]
    fn test_repeated_initialization_is_harmless() {
        init_logging(Some("debug"));
        init_logging_from_config(None);
        tracing::debug!("logging initialized twice without panicking");
    }
}
