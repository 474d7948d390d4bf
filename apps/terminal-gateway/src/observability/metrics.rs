//! Prometheus metrics for the terminal gateway.
//!
//! # Example
//!
//! ```ignore
//! use terminal_gateway::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config)?;
//!
//! record_order_submission("open", "filled");
//! ```

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for terminal call latency (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9090)),
            // 1ms to 10s, the default terminal deadline
            latency_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Order Execution Metrics
// ============================================================================

/// Record an order submission.
///
/// # Arguments
///
/// * `kind` - `"open"` or `"close"`
/// * `outcome` - `"filled"`, `"rejected"` or `"failed"`
pub fn record_order_submission(kind: &'static str, outcome: &'static str) {
    counter!(
        "gateway_order_submissions_total",
        "kind" => kind,
        "outcome" => outcome
    )
    .increment(1);
}

// ============================================================================
// Terminal Metrics
// ============================================================================

/// Record the latency of one terminal call.
pub fn record_terminal_call(operation: &'static str, latency_seconds: f64) {
    histogram!("gateway_terminal_call_seconds", "operation" => operation).record(latency_seconds);
}

/// Record a terminal call that exceeded its deadline.
pub fn record_terminal_timeout(operation: &'static str) {
    counter!("gateway_terminal_timeouts_total", "operation" => operation).increment(1);
}

// ============================================================================
// Session Metrics
// ============================================================================

/// Update the registered sessions gauge.
pub fn set_active_sessions(count: usize) {
    gauge!("gateway_active_sessions").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert_eq!(config.listen_addr.port(), 9090);
        assert!(!config.latency_buckets.is_empty());
    }

    #[test]
    fn test_metrics_config_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9191".parse().unwrap();
        let config = MetricsConfig::with_addr(addr);
        assert_eq!(config.listen_addr, addr);
    }

    // Without an installed recorder these are no-ops; they must not panic.
    #[test]
    fn test_record_without_recorder() {
        record_order_submission("open", "filled");
        record_terminal_call("login", 0.01);
        record_terminal_timeout("submit_order");
        set_active_sessions(1);
    }
}
