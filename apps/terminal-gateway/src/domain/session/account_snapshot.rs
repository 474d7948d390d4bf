//! Account state as last read from the terminal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time account figures.
///
/// Refreshed on demand; never streamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Equity (balance plus floating profit).
    #[serde(with = "rust_decimal::serde::float")]
    pub equity: Decimal,
    /// Margin in use.
    #[serde(with = "rust_decimal::serde::float")]
    pub margin: Decimal,
    /// Margin still available.
    #[serde(with = "rust_decimal::serde::float")]
    pub free_margin: Decimal,
    /// Margin level in percent.
    #[serde(with = "rust_decimal::serde::float")]
    pub margin_level: Decimal,
    /// Deposit currency.
    pub currency: String,
    /// Account leverage (the `N` in 1:N).
    pub leverage: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn snapshot_serializes_with_snake_case_fields() {
        let snapshot = AccountSnapshot {
            balance: dec!(1000),
            equity: dec!(1000),
            margin: Decimal::ZERO,
            free_margin: dec!(1000),
            margin_level: Decimal::ZERO,
            currency: "USD".to_string(),
            leverage: 500,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["free_margin"].is_number());
        assert_eq!(json["free_margin"].as_f64(), Some(1000.0));
        assert_eq!(json["leverage"], 500);
    }
}
