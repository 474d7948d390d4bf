//! Terminal Port (Driven Port)
//!
//! Interface to the trading terminal: one process-wide handle that holds at
//! most one authenticated account at a time. "Null" answers from the
//! terminal are modelled as `Option::None`; `TerminalError` is reserved for
//! the bridge itself failing.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::session::AccountSnapshot;
use crate::domain::shared::{AccountLogin, DealNumber, OrderNumber, Symbol, Ticket};
use crate::domain::trading::{Deal, ExecutionTag, HistoryWindow, OrderSide, Position};

/// Trade request action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    /// Immediate market deal.
    Deal,
}

/// Order lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderTime {
    /// Good till cancelled.
    Gtc,
}

/// Fill policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FillPolicy {
    /// Immediate or cancel.
    Ioc,
}

/// Order command sent to the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalCommand {
    /// Trade action.
    pub action: TradeAction,
    /// Instrument.
    pub symbol: Symbol,
    /// Lots.
    pub volume: Decimal,
    /// Direction.
    pub side: OrderSide,
    /// Requested price.
    pub price: Decimal,
    /// Accepted slippage in points.
    pub deviation: u32,
    /// Execution tag.
    pub tag: ExecutionTag,
    /// Order comment.
    pub comment: String,
    /// Order lifetime.
    pub time_in_force: OrderTime,
    /// Fill policy.
    pub filling: FillPolicy,
    /// Stop-loss level.
    pub stop_loss: Option<Decimal>,
    /// Take-profit level.
    pub take_profit: Option<Decimal>,
    /// Position being closed, for closing deals.
    pub position: Option<Ticket>,
}

impl TerminalCommand {
    /// Market deal with the gateway's fixed lifetime and fill policy.
    #[must_use]
    pub fn market_deal(
        symbol: Symbol,
        side: OrderSide,
        volume: Decimal,
        price: Decimal,
        deviation: u32,
        tag: ExecutionTag,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            action: TradeAction::Deal,
            symbol,
            volume,
            side,
            price,
            deviation,
            tag,
            comment: comment.into(),
            time_in_force: OrderTime::Gtc,
            filling: FillPolicy::Ioc,
            stop_loss: None,
            take_profit: None,
            position: None,
        }
    }

    /// Attach stop-loss and take-profit levels.
    #[must_use]
    pub const fn with_protection(
        mut self,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    ) -> Self {
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        self
    }

    /// Mark the deal as closing an existing position.
    #[must_use]
    pub const fn closing(mut self, ticket: Ticket) -> Self {
        self.position = Some(ticket);
        self
    }
}

/// Terminal trade server return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(pub u32);

impl ResultCode {
    /// Request completed.
    pub const DONE: Self = Self(10009);

    /// Whether this is the canonical "done" code.
    #[must_use]
    pub fn is_done(self) -> bool {
        self == Self::DONE
    }
}

/// Terminal answer to an order command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeResult {
    /// Return code.
    pub result_code: ResultCode,
    /// Order number (zero when rejected).
    pub order: OrderNumber,
    /// Deal number (zero when rejected).
    pub deal: DealNumber,
    /// Filled lots.
    pub volume: Decimal,
    /// Fill price.
    pub price: Decimal,
    /// Trade server comment.
    pub comment: String,
}

/// Symbol properties relevant to order routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Whether the symbol is selected in Market Watch.
    pub visible: bool,
}

/// Current best prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
}

impl Tick {
    /// Price an order on `side` executes at.
    #[must_use]
    pub const fn price_for(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Buy => self.ask,
            OrderSide::Sell => self.bid,
        }
    }
}

/// Terminal's last-error diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalDiagnostic {
    /// Error code.
    pub code: i64,
    /// Description.
    pub message: String,
}

/// Failure of the terminal bridge itself.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TerminalError {
    /// Bridge to the terminal process is down.
    #[error("Terminal bridge disconnected: {message}")]
    Disconnected {
        /// Error details.
        message: String,
    },

    /// Bridge raised an unexpected error.
    #[error("Terminal error: {message}")]
    Internal {
        /// Error details.
        message: String,
    },
}

/// Port for the trading terminal.
#[async_trait]
pub trait TerminalPort: Send + Sync {
    /// Start (or attach to) the terminal process.
    async fn initialize(&self) -> Result<bool, TerminalError>;

    /// Authenticate an account, replacing any current login.
    async fn login(
        &self,
        login: AccountLogin,
        secret: &str,
        server: &str,
    ) -> Result<bool, TerminalError>;

    /// Diagnostic for the last failed call.
    async fn last_error(&self) -> Result<TerminalDiagnostic, TerminalError>;

    /// Drop the current login.
    async fn logout(&self) -> Result<(), TerminalError>;

    /// Read account figures for the logged-in account.
    async fn account_snapshot(&self) -> Result<Option<AccountSnapshot>, TerminalError>;

    /// Look up a symbol.
    async fn resolve_symbol(&self, symbol: &Symbol) -> Result<Option<SymbolInfo>, TerminalError>;

    /// Select a symbol into Market Watch.
    async fn make_visible(&self, symbol: &Symbol) -> Result<bool, TerminalError>;

    /// Latest tick for a symbol.
    async fn current_tick(&self, symbol: &Symbol) -> Result<Option<Tick>, TerminalError>;

    /// Send an order command.
    async fn submit_order(
        &self,
        command: TerminalCommand,
    ) -> Result<Option<TradeResult>, TerminalError>;

    /// Open positions, optionally restricted to one symbol.
    async fn open_positions(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Option<Vec<Position>>, TerminalError>;

    /// Open positions with the given ticket (zero or one).
    async fn open_positions_by_ticket(&self, ticket: Ticket)
    -> Result<Vec<Position>, TerminalError>;

    /// Deals executed within `window`, optionally restricted to a symbol
    /// group pattern such as `*EURUSD*`.
    async fn history_deals(
        &self,
        window: HistoryWindow,
        group: Option<&str>,
    ) -> Result<Option<Vec<Deal>>, TerminalError>;
}
