//! Time window for history queries.

use serde::{Deserialize, Serialize};

use crate::domain::shared::Timestamp;

/// Inclusive `[from, to]` range for deal history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    /// Start of the window.
    pub from: Timestamp,
    /// End of the window.
    pub to: Timestamp,
}

impl HistoryWindow {
    /// Resolve optional bounds, defaulting to `epoch..now`.
    #[must_use]
    pub fn resolve(from: Option<Timestamp>, to: Option<Timestamp>, epoch: Timestamp) -> Self {
        Self {
            from: from.unwrap_or(epoch),
            to: to.unwrap_or_else(Timestamp::now),
        }
    }

    /// Whether `at` falls within the window.
    #[must_use]
    pub fn contains(&self, at: Timestamp) -> bool {
        self.from <= at && at <= self.to
    }
}
