//! A caller's request to open a market position.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExecutionTag, OrderSide};
use crate::domain::shared::{SessionId, Symbol};
use crate::domain::trading::errors::IntentError;

/// Order intent as received from the caller.
///
/// Without `limit_price` the order executes at the current quote; with it,
/// the terminal is asked to fill at that price within the deviation
/// tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Session the order is placed through.
    pub session_id: SessionId,
    /// Instrument.
    pub symbol: Symbol,
    /// Direction.
    pub side: OrderSide,
    /// Lots; must be positive.
    pub volume: Decimal,
    /// Explicit execution price.
    pub limit_price: Option<Decimal>,
    /// Stop-loss level.
    pub stop_loss: Option<Decimal>,
    /// Take-profit level.
    pub take_profit: Option<Decimal>,
    /// Execution tag.
    pub tag: ExecutionTag,
    /// Free-text comment stored on the order.
    pub comment: String,
}

impl OrderIntent {
    /// Check the intent before anything is sent to the terminal.
    ///
    /// Lot-step and price rounding are left to the terminal.
    pub fn validate(&self) -> Result<(), IntentError> {
        if self.volume <= Decimal::ZERO {
            return Err(IntentError::NonPositiveVolume {
                volume: self.volume,
            });
        }
        if self.symbol.is_empty() {
            return Err(IntentError::EmptySymbol);
        }
        if let Some(price) = self.limit_price
            && price <= Decimal::ZERO
        {
            return Err(IntentError::NonPositivePrice { price });
        }
        Ok(())
    }

    /// Whether the order executes at the live quote.
    #[must_use]
    pub const fn is_market(&self) -> bool {
        self.limit_price.is_none()
    }
}
