//! Terminal call policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Terminal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Deadline for any single terminal call.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    /// Accepted slippage on market deals, in points.
    #[serde(default = "default_price_deviation_points")]
    pub price_deviation_points: u32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
            price_deviation_points: default_price_deviation_points(),
        }
    }
}

impl TerminalConfig {
    /// Call deadline as a [`Duration`].
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

const fn default_call_timeout_ms() -> u64 {
    10_000
}

const fn default_price_deviation_points() -> u32 {
    20
}
