//! Execution tag attached to every order the gateway submits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker distinguishing the gateway's own orders and deals from other
/// account activity (the terminal's "magic number").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionTag(u64);

impl ExecutionTag {
    /// Wrap a raw tag value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw tag value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExecutionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
