//! Accepted execution report.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{DealNumber, OrderNumber};

/// Result of an order the terminal accepted.
///
/// Only produced for the terminal's "done" code; rejections never yield a
/// partial outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOutcome {
    /// Terminal order number.
    pub order_id: OrderNumber,
    /// Terminal deal number.
    pub deal_id: DealNumber,
    /// Filled lots.
    #[serde(with = "rust_decimal::serde::float")]
    pub filled_volume: Decimal,
    /// Fill price.
    #[serde(with = "rust_decimal::serde::float")]
    pub filled_price: Decimal,
    /// Terminal's comment on the fill.
    pub terminal_comment: String,
    /// Terminal result code.
    pub result_code: u32,
}
