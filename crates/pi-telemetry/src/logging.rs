//! Structured logging setup.
//!
//! JSON output carries consistent fields for log shippers:
//! - `timestamp`, `level`, `target`
//! - `plugin`: plugin id, stamped by [`log_event!`](crate::log_event)
//! - `message` plus any event fields (`token`, `status`, ...)

use crate::{TelemetryConfig, TelemetryError};
use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TEST_LOGGING: Once = Once::new();

/// Install the global subscriber.
///
/// Fails if the filter directive does not parse or a global subscriber is
/// already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level {:?}: {}", config.log_level, e)))?;

    let json_layer = (config.console_output && config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });
    let fmt_layer = (config.console_output && !config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Install a test subscriber writing through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_logging() {
    TEST_LOGGING.call_once(|| {
        let config = TelemetryConfig::for_testing();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
        // Another harness may have installed a subscriber already.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Emit an event stamped with the plugin id.
///
/// ```rust,ignore
/// log_event!(info, "pi", "Billing status changed", token = %token, to = %status);
/// ```
#[macro_export]
macro_rules! log_event {
    (info, $plugin:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::info!(
            plugin = $plugin,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $plugin:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::warn!(
            plugin = $plugin,
            $($($field)*,)?
            $msg
        )
    };

    (error, $plugin:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::error!(
            plugin = $plugin,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $plugin:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::debug!(
            plugin = $plugin,
            $($($field)*,)?
            $msg
        )
    };
}
