//! Order intent validation errors.

use rust_decimal::Decimal;

/// Reasons an order intent is refused before reaching the terminal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentError {
    /// Volume is zero or negative.
    #[error("volume must be positive, got {volume}")]
    NonPositiveVolume {
        /// The offending volume.
        volume: Decimal,
    },

    /// Side is neither BUY nor SELL.
    #[error("invalid order side '{value}', use BUY or SELL")]
    UnknownSide {
        /// The raw side value.
        value: String,
    },

    /// Symbol name is blank.
    #[error("symbol must not be empty")]
    EmptySymbol,

    /// Explicit price is zero or negative.
    #[error("price must be positive, got {price}")]
    NonPositivePrice {
        /// The offending price.
        price: Decimal,
    },
}
