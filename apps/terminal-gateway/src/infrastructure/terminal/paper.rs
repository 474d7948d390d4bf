//! In-memory simulated terminal.
//!
//! Behaves like a single-account trading terminal: one login at a time,
//! symbols with bid/ask quotes, market deals that open and close positions,
//! and a deal history. Every call is recorded so callers can assert on what
//! reached the terminal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{
    ResultCode, SymbolInfo, TerminalCommand, TerminalDiagnostic, TerminalError, TerminalPort,
    Tick, TradeResult,
};
use crate::domain::session::AccountSnapshot;
use crate::domain::shared::{AccountLogin, DealNumber, OrderNumber, Symbol, Ticket, Timestamp};
use crate::domain::trading::{Deal, HistoryWindow, OrderSide, Position};

const RES_S_OK: i64 = 1;
const RES_E_AUTH_FAILED: i64 = -6;
const RES_E_INTERNAL_FAIL_INIT: i64 = -10_003;
const RES_E_NOT_LOGGED_IN: i64 = -10_004;

/// How the terminal answers order submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBehavior {
    /// Fill at the requested price.
    Fill,
    /// Answer with a non-done result code.
    Reject {
        /// Trade server return code.
        code: u32,
        /// Trade server comment.
        comment: String,
    },
    /// Answer with no result at all.
    NoResponse,
}

#[derive(Debug, Clone)]
struct PaperAccount {
    secret: String,
    snapshot: AccountSnapshot,
}

#[derive(Debug, Clone)]
struct PaperSymbol {
    visible: bool,
    selectable: bool,
    tick: Option<Tick>,
}

#[derive(Debug)]
struct PaperState {
    initialized: bool,
    initialize_result: bool,
    accounts: HashMap<(AccountLogin, String), PaperAccount>,
    open_account: Option<AccountSnapshot>,
    logged_in: Option<AccountSnapshot>,
    snapshot_available: bool,
    bridge_down: bool,
    last_error: TerminalDiagnostic,
    symbols: HashMap<String, PaperSymbol>,
    positions: Vec<Position>,
    deals: Vec<Deal>,
    submit_behavior: SubmitBehavior,
    latency: Duration,
    call_latency: HashMap<&'static str, Duration>,
    calls: Vec<&'static str>,
    submitted: Vec<TerminalCommand>,
    submitted_as: Vec<Option<AccountLogin>>,
    login_account: Option<AccountLogin>,
}

impl Default for PaperState {
    fn default() -> Self {
        Self {
            initialized: false,
            initialize_result: true,
            accounts: HashMap::new(),
            open_account: None,
            logged_in: None,
            snapshot_available: true,
            bridge_down: false,
            last_error: TerminalDiagnostic {
                code: RES_S_OK,
                message: "Success".to_string(),
            },
            symbols: HashMap::new(),
            positions: Vec::new(),
            deals: Vec::new(),
            submit_behavior: SubmitBehavior::Fill,
            latency: Duration::ZERO,
            call_latency: HashMap::new(),
            calls: Vec::new(),
            submitted: Vec::new(),
            submitted_as: Vec::new(),
            login_account: None,
        }
    }
}

/// Simulated trading terminal.
#[derive(Debug)]
pub struct PaperTerminal {
    state: Mutex<PaperState>,
    next_ticket: AtomicU64,
}

impl Default for PaperTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl PaperTerminal {
    /// Create a terminal with no accounts and no symbols.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PaperState::default()),
            next_ticket: AtomicU64::new(1000),
        }
    }

    /// Demo terminal: any credentials log in to a 10 000 USD account and a
    /// handful of forex and metal symbols are quoted.
    #[must_use]
    pub fn demo() -> Self {
        let balance = Decimal::new(10_000, 0);
        Self::new()
            .with_open_account(AccountSnapshot {
                balance,
                equity: balance,
                margin: Decimal::ZERO,
                free_margin: balance,
                margin_level: Decimal::ZERO,
                currency: "USD".to_string(),
                leverage: 100,
            })
            .with_symbol("EURUSD", Decimal::new(108_450, 5), Decimal::new(108_470, 5))
            .with_symbol("GBPUSD", Decimal::new(126_310, 5), Decimal::new(126_340, 5))
            .with_symbol("USDJPY", Decimal::new(151_220, 3), Decimal::new(151_250, 3))
            .with_symbol("XAUUSD", Decimal::new(238_415, 2), Decimal::new(238_445, 2))
    }

    fn lock(&self) -> MutexGuard<'_, PaperState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an account that accepts exactly these credentials.
    #[must_use]
    pub fn with_account(
        self,
        login: u64,
        secret: &str,
        server: &str,
        snapshot: AccountSnapshot,
    ) -> Self {
        self.lock().accounts.insert(
            (AccountLogin::new(login), server.to_string()),
            PaperAccount {
                secret: secret.to_string(),
                snapshot,
            },
        );
        self
    }

    /// Accept any credentials not registered with [`Self::with_account`].
    #[must_use]
    pub fn with_open_account(self, snapshot: AccountSnapshot) -> Self {
        self.lock().open_account = Some(snapshot);
        self
    }

    /// Quote a symbol already selected in Market Watch.
    #[must_use]
    pub fn with_symbol(self, name: &str, bid: Decimal, ask: Decimal) -> Self {
        self.insert_symbol(name, true, true, Some(Tick { bid, ask }));
        self
    }

    /// Quote a symbol that must be selected before trading.
    #[must_use]
    pub fn with_hidden_symbol(self, name: &str, bid: Decimal, ask: Decimal, selectable: bool) -> Self {
        self.insert_symbol(name, false, selectable, Some(Tick { bid, ask }));
        self
    }

    /// Known symbol without a current tick.
    #[must_use]
    pub fn with_unquoted_symbol(self, name: &str) -> Self {
        self.insert_symbol(name, true, true, None);
        self
    }

    fn insert_symbol(&self, name: &str, visible: bool, selectable: bool, tick: Option<Tick>) {
        self.lock().symbols.insert(
            name.to_string(),
            PaperSymbol {
                visible,
                selectable,
                tick,
            },
        );
    }

    /// Update the quote for a symbol.
    pub fn set_tick(&self, name: &str, bid: Decimal, ask: Decimal) {
        if let Some(symbol) = self.lock().symbols.get_mut(name) {
            symbol.tick = Some(Tick { bid, ask });
        }
    }

    /// Choose how order submissions are answered.
    pub fn set_submit_behavior(&self, behavior: SubmitBehavior) {
        self.lock().submit_behavior = behavior;
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Delay one kind of call by `latency`, on top of [`Self::set_latency`].
    pub fn set_call_latency(&self, call: &'static str, latency: Duration) {
        self.lock().call_latency.insert(call, latency);
    }

    /// Make `initialize` succeed or fail.
    pub fn set_initialize_result(&self, ok: bool) {
        self.lock().initialize_result = ok;
    }

    /// Make account snapshots available or not.
    pub fn set_snapshot_available(&self, available: bool) {
        self.lock().snapshot_available = available;
    }

    /// Simulate the bridge to the terminal process going down.
    pub fn set_bridge_down(&self, down: bool) {
        self.lock().bridge_down = down;
    }

    /// Add an open position directly.
    pub fn seed_position(&self, position: Position) {
        self.lock().positions.push(position);
    }

    /// Add a history deal directly.
    pub fn seed_deal(&self, deal: Deal) {
        self.lock().deals.push(deal);
    }

    /// Names of the terminal calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    /// Order commands received so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<TerminalCommand> {
        self.lock().submitted.clone()
    }

    /// Account logged in when each order command was executed.
    #[must_use]
    pub fn submitted_as(&self) -> Vec<Option<AccountLogin>> {
        self.lock().submitted_as.clone()
    }

    /// Account currently logged in.
    #[must_use]
    pub fn logged_in(&self) -> Option<AccountLogin> {
        self.lock().login_account
    }

    async fn enter(&self, call: &'static str) -> Result<(), TerminalError> {
        let (latency, down) = {
            let mut state = self.lock();
            state.calls.push(call);
            let extra = state.call_latency.get(call).copied().unwrap_or_default();
            (state.latency + extra, state.bridge_down)
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if down {
            return Err(TerminalError::Disconnected {
                message: format!("{call}: IPC send failed"),
            });
        }
        Ok(())
    }

    fn next_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    fn fill(&self, state: &mut PaperState, command: &TerminalCommand) -> TradeResult {
        let order = self.next_ticket();
        let deal = self.next_ticket();
        let now = Timestamp::now();

        match command.position {
            Some(ticket) => {
                let opened = state
                    .positions
                    .iter()
                    .position(|p| p.ticket == ticket)
                    .map(|index| state.positions.remove(index));
                let profit = opened.as_ref().map_or(Decimal::ZERO, |p| {
                    let diff = command.price - p.open_price;
                    match p.side {
                        OrderSide::Buy => diff * p.volume,
                        OrderSide::Sell => -diff * p.volume,
                    }
                });
                state.deals.push(Deal {
                    ticket: Ticket::new(deal),
                    order_id: OrderNumber::new(order),
                    symbol: command.symbol.clone(),
                    side: command.side,
                    volume: command.volume,
                    price: command.price,
                    profit,
                    swap: Decimal::ZERO,
                    commission: Decimal::ZERO,
                    closed_at: now,
                    comment: command.comment.clone(),
                    tag: command.tag,
                });
            }
            None => {
                state.positions.push(Position {
                    ticket: Ticket::new(order),
                    symbol: command.symbol.clone(),
                    side: command.side,
                    volume: command.volume,
                    open_price: command.price,
                    current_price: command.price,
                    profit: Decimal::ZERO,
                    swap: Decimal::ZERO,
                    commission: Decimal::ZERO,
                    stop_loss: command.stop_loss.unwrap_or(Decimal::ZERO),
                    take_profit: command.take_profit.unwrap_or(Decimal::ZERO),
                    tag: command.tag,
                    comment: command.comment.clone(),
                    opened_at: now,
                    updated_at: now,
                });
                state.deals.push(Deal {
                    ticket: Ticket::new(deal),
                    order_id: OrderNumber::new(order),
                    symbol: command.symbol.clone(),
                    side: command.side,
                    volume: command.volume,
                    price: command.price,
                    profit: Decimal::ZERO,
                    swap: Decimal::ZERO,
                    commission: Decimal::ZERO,
                    closed_at: now,
                    comment: command.comment.clone(),
                    tag: command.tag,
                });
            }
        }

        TradeResult {
            result_code: ResultCode::DONE,
            order: OrderNumber::new(order),
            deal: DealNumber::new(deal),
            volume: command.volume,
            price: command.price,
            comment: "Request executed".to_string(),
        }
    }
}

/// Mark a position to the current quote.
fn mark(position: &Position, symbols: &HashMap<String, PaperSymbol>) -> Position {
    let mut marked = position.clone();
    if let Some(tick) = symbols.get(position.symbol.as_str()).and_then(|s| s.tick) {
        let price = tick.price_for(position.side.opposite());
        let diff = price - position.open_price;
        marked.current_price = price;
        marked.profit = match position.side {
            OrderSide::Buy => diff * position.volume,
            OrderSide::Sell => -diff * position.volume,
        };
    }
    marked
}

fn matches_group(symbol: &Symbol, group: &str) -> bool {
    let needle = group.trim_matches('*');
    needle.is_empty() || symbol.as_str().contains(needle)
}

#[async_trait]
impl TerminalPort for PaperTerminal {
    async fn initialize(&self) -> Result<bool, TerminalError> {
        self.enter("initialize").await?;
        let mut state = self.lock();
        state.initialized = state.initialize_result;
        if !state.initialized {
            state.last_error = TerminalDiagnostic {
                code: RES_E_INTERNAL_FAIL_INIT,
                message: "IPC initialize failed".to_string(),
            };
        }
        Ok(state.initialized)
    }

    async fn login(
        &self,
        login: AccountLogin,
        secret: &str,
        server: &str,
    ) -> Result<bool, TerminalError> {
        self.enter("login").await?;
        let mut state = self.lock();
        let snapshot = match state.accounts.get(&(login, server.to_string())) {
            Some(account) if account.secret == secret => Some(account.snapshot.clone()),
            Some(_) => None,
            None => state.open_account.clone(),
        };

        if let Some(snapshot) = snapshot.filter(|_| state.initialized) {
            state.logged_in = Some(snapshot);
            state.login_account = Some(login);
            state.last_error = TerminalDiagnostic {
                code: RES_S_OK,
                message: "Success".to_string(),
            };
            Ok(true)
        } else {
            state.logged_in = None;
            state.login_account = None;
            state.last_error = TerminalDiagnostic {
                code: RES_E_AUTH_FAILED,
                message: "Terminal: Authorization failed".to_string(),
            };
            Ok(false)
        }
    }

    async fn last_error(&self) -> Result<TerminalDiagnostic, TerminalError> {
        self.enter("last_error").await?;
        Ok(self.lock().last_error.clone())
    }

    async fn logout(&self) -> Result<(), TerminalError> {
        self.enter("logout").await?;
        let mut state = self.lock();
        state.logged_in = None;
        state.login_account = None;
        Ok(())
    }

    async fn account_snapshot(&self) -> Result<Option<AccountSnapshot>, TerminalError> {
        self.enter("account_snapshot").await?;
        let mut state = self.lock();
        if state.logged_in.is_none() {
            state.last_error = TerminalDiagnostic {
                code: RES_E_NOT_LOGGED_IN,
                message: "Terminal: Not logged in".to_string(),
            };
        }
        if !state.snapshot_available {
            return Ok(None);
        }
        Ok(state.logged_in.clone())
    }

    async fn resolve_symbol(&self, symbol: &Symbol) -> Result<Option<SymbolInfo>, TerminalError> {
        self.enter("resolve_symbol").await?;
        Ok(self
            .lock()
            .symbols
            .get(symbol.as_str())
            .map(|s| SymbolInfo { visible: s.visible }))
    }

    async fn make_visible(&self, symbol: &Symbol) -> Result<bool, TerminalError> {
        self.enter("make_visible").await?;
        Ok(match self.lock().symbols.get_mut(symbol.as_str()) {
            Some(s) if s.selectable => {
                s.visible = true;
                true
            }
            _ => false,
        })
    }

    async fn current_tick(&self, symbol: &Symbol) -> Result<Option<Tick>, TerminalError> {
        self.enter("current_tick").await?;
        Ok(self
            .lock()
            .symbols
            .get(symbol.as_str())
            .and_then(|s| s.tick))
    }

    async fn submit_order(
        &self,
        command: TerminalCommand,
    ) -> Result<Option<TradeResult>, TerminalError> {
        self.enter("submit_order").await?;
        let mut state = self.lock();
        state.submitted.push(command.clone());
        let account = state.login_account;
        state.submitted_as.push(account);

        match state.submit_behavior.clone() {
            SubmitBehavior::NoResponse => Ok(None),
            SubmitBehavior::Reject { code, comment } => Ok(Some(TradeResult {
                result_code: ResultCode(code),
                order: OrderNumber::new(0),
                deal: DealNumber::new(0),
                volume: Decimal::ZERO,
                price: Decimal::ZERO,
                comment,
            })),
            SubmitBehavior::Fill => Ok(Some(self.fill(&mut state, &command))),
        }
    }

    async fn open_positions(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Option<Vec<Position>>, TerminalError> {
        self.enter("open_positions").await?;
        let state = self.lock();
        if state.logged_in.is_none() {
            return Ok(None);
        }
        Ok(Some(
            state
                .positions
                .iter()
                .filter(|p| symbol.is_none_or(|s| &p.symbol == s))
                .map(|p| mark(p, &state.symbols))
                .collect(),
        ))
    }

    async fn open_positions_by_ticket(
        &self,
        ticket: Ticket,
    ) -> Result<Vec<Position>, TerminalError> {
        self.enter("open_positions_by_ticket").await?;
        let state = self.lock();
        Ok(state
            .positions
            .iter()
            .filter(|p| p.ticket == ticket)
            .map(|p| mark(p, &state.symbols))
            .collect())
    }

    async fn history_deals(
        &self,
        window: HistoryWindow,
        group: Option<&str>,
    ) -> Result<Option<Vec<Deal>>, TerminalError> {
        self.enter("history_deals").await?;
        let state = self.lock();
        if state.logged_in.is_none() {
            return Ok(None);
        }
        Ok(Some(
            state
                .deals
                .iter()
                .filter(|d| window.contains(d.closed_at))
                .filter(|d| group.is_none_or(|g| matches_group(&d.symbol, g)))
                .cloned()
                .collect(),
        ))
    }
}
