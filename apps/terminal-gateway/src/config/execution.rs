//! Execution tag, comments and history range.

use serde::{Deserialize, Serialize};

use crate::domain::shared::Timestamp;
use crate::domain::trading::ExecutionTag;

/// Execution configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Tag stamped on every order and used to scope deal history.
    #[serde(default = "default_tag")]
    pub tag: ExecutionTag,
    /// Default order comment.
    #[serde(default = "default_comment")]
    pub comment: String,
    /// Comment on closing deals.
    #[serde(default = "default_close_comment")]
    pub close_comment: String,
    /// Earliest history bound when a query gives none.
    #[serde(default = "default_history_epoch")]
    pub history_epoch: Timestamp,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            comment: default_comment(),
            close_comment: default_close_comment(),
            history_epoch: default_history_epoch(),
        }
    }
}

const fn default_tag() -> ExecutionTag {
    ExecutionTag::new(2025)
}

fn default_comment() -> String {
    "SIGNALIST Bot".to_string()
}

fn default_close_comment() -> String {
    "SIGNALIST Bot Close".to_string()
}

fn default_history_epoch() -> Timestamp {
    // 2020-01-01T00:00:00Z
    Timestamp::from_unix_seconds(1_577_836_800)
}
