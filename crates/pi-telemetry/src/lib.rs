//! # Pi Telemetry
//!
//! Structured logging for the pi plugin, built on `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pi_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PI_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `PI_JSON_LOGS` | `false` | JSON output |
//! | `PI_CONSOLE_OUTPUT` | `true` | Write to stdout |
//! | `PI_SERVICE_NAME` | `pi-plugin` | Service name |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    Init(String),

    /// Configuration could not be applied.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
