//! Query Trades Use Case

use std::sync::Arc;

use crate::application::ports::TerminalPort;
use crate::application::services::TerminalBinding;
use crate::domain::shared::{SessionId, Symbol, Timestamp};
use crate::domain::trading::{Deal, ExecutionTag, HistoryWindow, Position};
use crate::error::GatewayError;

/// Use case for open positions and closed-deal history.
///
/// History is scoped to deals carrying the gateway's own execution tag;
/// the rest of the account's activity is never returned.
pub struct QueryTradesUseCase<T>
where
    T: TerminalPort,
{
    binding: Arc<TerminalBinding<T>>,
    tag: ExecutionTag,
    history_epoch: Timestamp,
}

impl<T> QueryTradesUseCase<T>
where
    T: TerminalPort,
{
    /// Create a new QueryTradesUseCase.
    pub const fn new(
        binding: Arc<TerminalBinding<T>>,
        tag: ExecutionTag,
        history_epoch: Timestamp,
    ) -> Self {
        Self {
            binding,
            tag,
            history_epoch,
        }
    }

    /// Open positions, optionally for one symbol. Empty when there are none.
    ///
    /// # Errors
    ///
    /// `NotConnected` when the session is not bound to the terminal.
    pub async fn list_open_positions(
        &self,
        session_id: &SessionId,
        symbol: Option<Symbol>,
    ) -> Result<Vec<Position>, GatewayError> {
        let _bound = self.binding.attach(session_id).await?;
        let positions = self
            .binding
            .call(
                "open_positions",
                self.binding.terminal().open_positions(symbol.as_ref()),
            )
            .await?
            .unwrap_or_default();

        tracing::debug!(session_id = %session_id, count = positions.len(), "Listed open positions");
        Ok(positions)
    }

    /// Deals carrying the gateway's tag within `[from, to]`.
    ///
    /// Bounds default to the history epoch and now.
    ///
    /// # Errors
    ///
    /// `NotConnected` when the session is not bound to the terminal.
    pub async fn list_closed_deals(
        &self,
        session_id: &SessionId,
        symbol: Option<Symbol>,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<Deal>, GatewayError> {
        let _bound = self.binding.attach(session_id).await?;
        let window = HistoryWindow::resolve(from, to, self.history_epoch);
        let group = symbol.as_ref().map(Symbol::group_pattern);

        let deals: Vec<Deal> = self
            .binding
            .call(
                "history_deals",
                self.binding.terminal().history_deals(window, group.as_deref()),
            )
            .await?
            .unwrap_or_default()
            .into_iter()
            .filter(|deal| deal.tag == self.tag)
            .collect();

        tracing::debug!(session_id = %session_id, count = deals.len(), "Listed closed deals");
        Ok(deals)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::services::SessionRegistry;
    use crate::domain::session::{AccountSnapshot, Session};
    use crate::domain::shared::{AccountLogin, OrderNumber, Ticket};
    use crate::domain::trading::OrderSide;
    use crate::infrastructure::terminal::PaperTerminal;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn deal(ticket: u64, symbol: &str, tag: u64, closed_at: &str) -> Deal {
        Deal {
            ticket: Ticket::new(ticket),
            order_id: OrderNumber::new(ticket),
            symbol: Symbol::new(symbol),
            side: OrderSide::Sell,
            volume: dec!(0.1),
            price: dec!(1.1),
            profit: dec!(5),
            swap: Decimal::ZERO,
            commission: Decimal::ZERO,
            closed_at: Timestamp::parse(closed_at).unwrap(),
            comment: String::new(),
            tag: ExecutionTag::new(tag),
        }
    }

    async fn setup() -> (Arc<PaperTerminal>, QueryTradesUseCase<PaperTerminal>, SessionId) {
        let terminal = Arc::new(
            PaperTerminal::new()
                .with_open_account(AccountSnapshot {
                    balance: dec!(1000),
                    equity: dec!(1000),
                    margin: Decimal::ZERO,
                    free_margin: dec!(1000),
                    margin_level: Decimal::ZERO,
                    currency: "USD".to_string(),
                    leverage: 100,
                })
                .with_symbol("EURUSD", dec!(1.1000), dec!(1.1002)),
        );
        terminal.initialize().await.unwrap();
        terminal.login(AccountLogin::new(1), "x", "Demo").await.unwrap();

        let registry = Arc::new(SessionRegistry::new());
        let session = Session::new(AccountLogin::new(1), "Demo", None);
        let id = session.session_id().clone();
        registry.register(session);
        let binding = TerminalBinding::new(Arc::clone(&terminal), registry, Duration::from_secs(1));
        *binding.exclusive().await = Some(id.clone());

        let use_case = QueryTradesUseCase::new(
            Arc::new(binding),
            ExecutionTag::new(2025),
            Timestamp::parse("2020-01-01T00:00:00Z").unwrap(),
        );
        (terminal, use_case, id)
    }

    #[tokio::test]
    async fn deals_with_foreign_tags_are_dropped() {
        let (terminal, use_case, id) = setup().await;
        terminal.seed_deal(deal(1, "EURUSD", 2025, "2024-03-01T10:00:00Z"));
        terminal.seed_deal(deal(2, "EURUSD", 0, "2024-03-01T11:00:00Z"));
        terminal.seed_deal(deal(3, "EURUSD", 9999, "2024-03-01T12:00:00Z"));

        let deals = use_case.list_closed_deals(&id, None, None, None).await.unwrap();

        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].ticket, Ticket::new(1));
    }

    #[tokio::test]
    async fn deals_respect_window_and_symbol_group() {
        let (terminal, use_case, id) = setup().await;
        terminal.seed_deal(deal(1, "EURUSD", 2025, "2019-06-01T00:00:00Z"));
        terminal.seed_deal(deal(2, "EURUSD.m", 2025, "2024-03-01T00:00:00Z"));
        terminal.seed_deal(deal(3, "GBPUSD", 2025, "2024-03-01T00:00:00Z"));

        let deals = use_case
            .list_closed_deals(&id, Some(Symbol::new("EURUSD")), None, None)
            .await
            .unwrap();
        assert_eq!(deals.iter().map(|d| d.ticket.value()).collect::<Vec<_>>(), vec![2]);

        let march = use_case
            .list_closed_deals(
                &id,
                None,
                Some(Timestamp::parse("2024-02-01T00:00:00Z").unwrap()),
                Some(Timestamp::parse("2024-04-01T00:00:00Z").unwrap()),
            )
            .await
            .unwrap();
        assert_eq!(march.len(), 2);
    }

    #[tokio::test]
    async fn no_positions_is_empty_not_error() {
        let (_, use_case, id) = setup().await;
        let positions = use_case.list_open_positions(&id, None).await.unwrap();
        assert!(positions.is_empty());
    }

    #[tokio::test]
    async fn open_positions_are_marked_to_current_tick() {
        let (terminal, use_case, id) = setup().await;
        let opened_at = Timestamp::parse("2024-03-01T10:00:00Z").unwrap();
        terminal.seed_position(Position {
            ticket: Ticket::new(77),
            symbol: Symbol::new("EURUSD"),
            side: OrderSide::Buy,
            volume: dec!(2),
            open_price: dec!(1.1000),
            current_price: dec!(1.1000),
            profit: Decimal::ZERO,
            swap: Decimal::ZERO,
            commission: Decimal::ZERO,
            stop_loss: Decimal::ZERO,
            take_profit: Decimal::ZERO,
            tag: ExecutionTag::new(2025),
            comment: String::new(),
            opened_at,
            updated_at: opened_at,
        });
        terminal.set_tick("EURUSD", dec!(1.1050), dec!(1.1052));

        let positions = use_case
            .list_open_positions(&id, Some(Symbol::new("EURUSD")))
            .await
            .unwrap();

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].current_price, dec!(1.1050));
        assert_eq!(positions[0].profit, dec!(0.0100));
    }

    #[tokio::test]
    async fn stale_session_is_not_connected() {
        let (terminal, use_case, _) = setup().await;
        let err = use_case
            .list_open_positions(&SessionId::new("2_Demo"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotConnected { .. }));
        assert!(!terminal.calls().contains(&"open_positions"));
    }
}
