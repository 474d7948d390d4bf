//! Execute Order Use Case
//!
//! Each request moves through `Validated -> PriceResolved -> Submitted ->
//! {Accepted | Rejected}`. Nothing is retried: a repeated submission could
//! fill twice. A submitted order keeps the terminal bound to its session
//! until the terminal answers, even past the caller's deadline.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::ports::{TerminalCommand, TerminalPort, Tick, TradeResult};
use crate::application::services::{Attached, TerminalBinding};
use crate::domain::shared::{SessionId, Symbol, Ticket};
use crate::domain::trading::{ExecutionTag, OrderIntent, OrderOutcome};
use crate::error::GatewayError;
use crate::observability;

/// Execution constants injected from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSettings {
    /// Tag stamped on every order the gateway sends.
    pub tag: ExecutionTag,
    /// Default order comment.
    pub comment: String,
    /// Comment on closing deals.
    pub close_comment: String,
    /// Accepted slippage in points.
    pub deviation: u32,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            tag: ExecutionTag::new(2025),
            comment: "SIGNALIST Bot".to_string(),
            close_comment: "SIGNALIST Bot Close".to_string(),
            deviation: 20,
        }
    }
}

/// Use case for placing market orders and closing positions.
pub struct ExecuteOrderUseCase<T>
where
    T: TerminalPort,
{
    binding: Arc<TerminalBinding<T>>,
    settings: ExecutionSettings,
}

impl<T> ExecuteOrderUseCase<T>
where
    T: TerminalPort + 'static,
{
    /// Create a new ExecuteOrderUseCase.
    pub const fn new(binding: Arc<TerminalBinding<T>>, settings: ExecutionSettings) -> Self {
        Self { binding, settings }
    }

    /// Execution settings in effect.
    pub const fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Place a market order.
    ///
    /// # Errors
    ///
    /// `InvalidOrderIntent` before any terminal call when the intent is
    /// malformed; `NotConnected`, `UnknownSymbol`, `SymbolUnavailable`,
    /// `QuoteUnavailable`, `SubmissionFailed` or `OrderRejected` otherwise.
    pub async fn place_order(&self, intent: OrderIntent) -> Result<OrderOutcome, GatewayError> {
        intent.validate()?;
        let attached = self.binding.attach(&intent.session_id).await?;

        self.ensure_tradable(&intent.symbol).await?;

        let price = match intent.limit_price {
            Some(price) => price,
            None => self.quote(&intent.symbol).await?.price_for(intent.side),
        };

        let command = TerminalCommand::market_deal(
            intent.symbol.clone(),
            intent.side,
            intent.volume,
            price,
            self.settings.deviation,
            intent.tag,
            intent.comment,
        )
        .with_protection(intent.stop_loss, intent.take_profit);

        tracing::info!(
            session_id = %intent.session_id,
            symbol = %intent.symbol,
            side = %intent.side,
            volume = %intent.volume,
            %price,
            "Submitting order"
        );
        let result = self.submit(attached, command).await;
        let outcome = record("open", result.and_then(|r| interpret(r, "Order send failed")))?;
        tracing::info!(order_id = %outcome.order_id, deal_id = %outcome.deal_id, "Order filled");
        Ok(outcome)
    }

    /// Close an open position at the opposing price.
    ///
    /// # Errors
    ///
    /// `PositionNotFound` without any submission when the ticket is not
    /// open; otherwise as [`Self::place_order`].
    pub async fn close_position(
        &self,
        session_id: &SessionId,
        ticket: Ticket,
    ) -> Result<OrderOutcome, GatewayError> {
        let attached = self.binding.attach(session_id).await?;

        let position = self
            .binding
            .call(
                "open_positions_by_ticket",
                self.binding.terminal().open_positions_by_ticket(ticket),
            )
            .await?
            .into_iter()
            .next()
            .ok_or(GatewayError::PositionNotFound { ticket })?;

        let side = position.side.opposite();
        let price: Decimal = self.quote(&position.symbol).await?.price_for(side);

        let command = TerminalCommand::market_deal(
            position.symbol.clone(),
            side,
            position.volume,
            price,
            self.settings.deviation,
            position.tag,
            self.settings.close_comment.clone(),
        )
        .closing(ticket);

        tracing::info!(session_id = %session_id, %ticket, symbol = %position.symbol, %price, "Closing position");
        let result = self.submit(attached, command).await;
        record("close", result.and_then(|r| interpret(r, "Close order failed")))
    }

    async fn ensure_tradable(&self, symbol: &Symbol) -> Result<(), GatewayError> {
        let terminal = self.binding.terminal();
        let info = self
            .binding
            .call("resolve_symbol", terminal.resolve_symbol(symbol))
            .await?
            .ok_or_else(|| GatewayError::UnknownSymbol {
                symbol: symbol.clone(),
            })?;

        if !info.visible
            && !self
                .binding
                .call("make_visible", terminal.make_visible(symbol))
                .await?
        {
            return Err(GatewayError::SymbolUnavailable {
                symbol: symbol.clone(),
            });
        }
        Ok(())
    }

    async fn quote(&self, symbol: &Symbol) -> Result<Tick, GatewayError> {
        self.binding
            .call("current_tick", self.binding.terminal().current_tick(symbol))
            .await?
            .ok_or_else(|| GatewayError::QuoteUnavailable {
                symbol: symbol.clone(),
            })
    }

    async fn submit(
        &self,
        attached: Attached,
        command: TerminalCommand,
    ) -> Result<Option<TradeResult>, GatewayError> {
        self.binding
            .call_detached("submit_order", attached, move |terminal| async move {
                terminal.submit_order(command).await
            })
            .await
    }
}

/// Interpret a terminal answer.
///
/// Only the canonical done code yields an outcome.
fn interpret(result: Option<TradeResult>, failure: &str) -> Result<OrderOutcome, GatewayError> {
    let result = result.ok_or_else(|| GatewayError::SubmissionFailed {
        message: failure.to_string(),
    })?;

    if !result.result_code.is_done() {
        return Err(GatewayError::OrderRejected {
            code: result.result_code.0,
            comment: result.comment,
        });
    }

    Ok(OrderOutcome {
        order_id: result.order,
        deal_id: result.deal,
        filled_volume: result.volume,
        filled_price: result.price,
        terminal_comment: result.comment,
        result_code: result.result_code.0,
    })
}

fn record(
    kind: &'static str,
    result: Result<OrderOutcome, GatewayError>,
) -> Result<OrderOutcome, GatewayError> {
    let outcome = match &result {
        Ok(_) => "filled",
        Err(GatewayError::OrderRejected { code, comment }) => {
            tracing::warn!(kind, code, %comment, "Order rejected");
            "rejected"
        }
        Err(e) => {
            tracing::warn!(kind, error = %e, "Order submission failed");
            "failed"
        }
    };
    observability::record_order_submission(kind, outcome);
    result
}
