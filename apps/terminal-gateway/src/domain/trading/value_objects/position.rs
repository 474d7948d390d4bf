//! Open position projection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExecutionTag, OrderSide};
use crate::domain::shared::{Symbol, Ticket, Timestamp};

/// An open position as reported by the terminal.
///
/// Read-only and never cached beyond a single query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Position ticket.
    pub ticket: Ticket,
    /// Instrument.
    pub symbol: Symbol,
    /// Direction.
    pub side: OrderSide,
    /// Open lots.
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
    /// Entry price.
    #[serde(with = "rust_decimal::serde::float")]
    pub open_price: Decimal,
    /// Current market price.
    #[serde(with = "rust_decimal::serde::float")]
    pub current_price: Decimal,
    /// Floating profit.
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Decimal,
    /// Accumulated swap.
    #[serde(with = "rust_decimal::serde::float")]
    pub swap: Decimal,
    /// Commission charged.
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Decimal,
    /// Stop-loss level (zero when unset).
    #[serde(with = "rust_decimal::serde::float")]
    pub stop_loss: Decimal,
    /// Take-profit level (zero when unset).
    #[serde(with = "rust_decimal::serde::float")]
    pub take_profit: Decimal,
    /// Execution tag the position was opened with.
    pub tag: ExecutionTag,
    /// Order comment.
    pub comment: String,
    /// Open time.
    pub opened_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}
