//! # Vault Telemetry
//!
//! Structured logging and Prometheus metrics for the message vault.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vault_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VAULT_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `VAULT_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |
//! | `VAULT_SERVICE_NAME` | `message-vault` | Service name in logs |
//! | `VAULT_NETWORK` | `sepolia` | Network name in logs |

#![warn(missing_docs)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{encode_metrics, register_metrics};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Why telemetry could not be installed.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed.
    #[error("tracing subscriber: {0}")]
    TracingInit(String),

    /// A metric could not be registered or encoded.
    #[error("prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Installs the tracing subscriber and registers the vault counters.
///
/// Hold the returned guard for the lifetime of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_tracing(config)?;
    register_metrics()?;

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Logs shutdown when dropped.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "telemetry shut down");
    }
}
