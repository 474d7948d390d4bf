//! Observability module for metrics.
//!
//! Prometheus counters and gauges for order submissions, terminal calls and
//! sessions. Log and trace setup lives in [`crate::telemetry`].

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_order_submission, record_terminal_call,
    record_terminal_timeout, set_active_sessions,
};
