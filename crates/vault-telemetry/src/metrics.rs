//! Prometheus metrics for the message vault.
//!
//! Names follow `vault_<what>_total`. Counters live in a process-wide
//! registry and are safe to bump before [`register_metrics`] runs; they only
//! show up in [`encode_metrics`] once registered.

use lazy_static::lazy_static;
use prometheus::core::Collector;
use prometheus::{Counter, CounterVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Registry scraped by [`encode_metrics`].
    pub static ref REGISTRY: Registry = Registry::new_custom(Some("vault".into()), None)
        .unwrap_or_default();

    /// Validations, labelled `authorized` or `rejected`.
    pub static ref VALIDATIONS: CounterVec = CounterVec::new(
        Opts::new("validations_total", "User operations validated"),
        &["outcome"]
    ).expect("valid metric definition");

    /// Messages stored by committed calls.
    pub static ref MESSAGES_STORED: Counter = Counter::new(
        "messages_stored_total",
        "Messages stored"
    ).expect("valid metric definition");

    /// Hard failures, labelled by error kind.
    pub static ref CALLS_REVERTED: CounterVec = CounterVec::new(
        Opts::new("calls_reverted_total", "Calls that reverted"),
        &["kind"]
    ).expect("valid metric definition");
}

/// Adds every vault counter to [`REGISTRY`]. Calling it again is a no-op.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let collectors: [Box<dyn Collector>; 3] = [
        Box::new(VALIDATIONS.clone()),
        Box::new(MESSAGES_STORED.clone()),
        Box::new(CALLS_REVERTED.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(err) => return Err(TelemetryError::MetricsInit(err.to_string())),
        }
    }
    Ok(())
}

/// Registered metrics in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    TextEncoder::new()
        .encode_to_string(&REGISTRY.gather())
        .map_err(|err| TelemetryError::MetricsInit(err.to_string()))
}

/// Count one validation.
pub fn record_validation(authorized: bool) {
    let outcome = if authorized { "authorized" } else { "rejected" };
    VALIDATIONS.with_label_values(&[outcome]).inc();
}

/// Count `count` stored messages.
#[allow(clippy::cast_precision_loss)]
pub fn record_messages_stored(count: u64) {
    if count > 0 {
        MESSAGES_STORED.inc_by(count as f64);
    }
}

/// Count one reverted call.
pub fn record_call_reverted(kind: &str) {
    CALLS_REVERTED.with_label_values(&[kind]).inc();
}
