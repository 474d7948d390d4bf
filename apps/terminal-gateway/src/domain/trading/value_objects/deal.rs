//! Historical deal record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExecutionTag, OrderSide};
use crate::domain::shared::{OrderNumber, Symbol, Ticket, Timestamp};

/// A completed execution from account history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// Deal ticket.
    pub ticket: Ticket,
    /// Order that produced the deal.
    pub order_id: OrderNumber,
    /// Instrument.
    pub symbol: Symbol,
    /// Direction.
    pub side: OrderSide,
    /// Executed lots.
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
    /// Execution price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Realised profit.
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Decimal,
    /// Swap.
    #[serde(with = "rust_decimal::serde::float")]
    pub swap: Decimal,
    /// Commission.
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Decimal,
    /// Execution time.
    pub closed_at: Timestamp,
    /// Deal comment.
    pub comment: String,
    /// Execution tag of the originating order.
    pub tag: ExecutionTag,
}
