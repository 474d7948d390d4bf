//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases. Every
//! handler answers with an [`Envelope`]; the status code follows the
//! envelope's error reason.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::IntoResponse,
    routing::{get, post},
};

use crate::application::dto::{DisconnectedDto, Envelope, SessionSummaryDto, normalize};
use crate::application::ports::TerminalPort;
use crate::application::use_cases::{
    ExecuteOrderUseCase, QueryTradesUseCase, SessionLifecycleUseCase,
};
use crate::domain::session::AccountSnapshot;
use crate::domain::trading::{Deal, OrderOutcome, OrderSide, Position};
use crate::error::GatewayError;

use super::request::{
    AccountQuery, ClosePositionRequest, ClosedTradesQuery, ConnectRequest, DisconnectRequest,
    OpenTradesQuery, TradeRequest,
};
use super::response::HealthResponse;

/// Application state shared across handlers.
pub struct AppState<T>
where
    T: TerminalPort,
{
    /// Use case for connect/disconnect/account.
    pub lifecycle: Arc<SessionLifecycleUseCase<T>>,
    /// Use case for placing and closing orders.
    pub execute_order: Arc<ExecuteOrderUseCase<T>>,
    /// Use case for positions and deal history.
    pub query_trades: Arc<QueryTradesUseCase<T>>,
    /// Application version.
    pub version: String,
}

impl<T> Clone for AppState<T>
where
    T: TerminalPort,
{
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
            execute_order: Arc::clone(&self.execute_order),
            query_trades: Arc::clone(&self.query_trades),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<T>(state: AppState<T>) -> Router
where
    T: TerminalPort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
        .route("/account", get(account))
        .route("/trade", post(trade))
        .route("/trade/buy", post(buy))
        .route("/trade/sell", post(sell))
        .route("/trades/open", get(open_trades))
        .route("/trades/closed", get(closed_trades))
        .route("/position/close", post(close_position))
        .with_state(state)
}

fn bad_body(rejection: JsonRejection) -> GatewayError {
    GatewayError::invalid_request(rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> GatewayError {
    GatewayError::invalid_request(rejection.body_text())
}

/// Health check endpoint.
async fn health_check<T>(State(state): State<AppState<T>>) -> impl IntoResponse
where
    T: TerminalPort + 'static,
{
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "terminal-gateway".to_string(),
        version: state.version.clone(),
        active_sessions: state.lifecycle.active_sessions(),
    })
}

async fn connect<T>(
    State(state): State<AppState<T>>,
    body: Result<Json<ConnectRequest>, JsonRejection>,
) -> Envelope<SessionSummaryDto>
where
    T: TerminalPort + 'static,
{
    normalize("connect", async move {
        let Json(request) = body.map_err(bad_body)?;
        let (login, password, server) = request.into_parts()?;
        let session = state.lifecycle.connect(login, &password, &server).await?;
        Ok(SessionSummaryDto::from_session(&session))
    })
    .await
}

async fn disconnect<T>(
    State(state): State<AppState<T>>,
    body: Result<Json<DisconnectRequest>, JsonRejection>,
) -> Envelope<DisconnectedDto>
where
    T: TerminalPort + 'static,
{
    normalize("disconnect", async move {
        let Json(request) = body.map_err(bad_body)?;
        let session_id = request.session_id()?;
        state.lifecycle.disconnect(&session_id).await?;
        Ok(DisconnectedDto {
            session_id: session_id.into_inner(),
        })
    })
    .await
}

async fn account<T>(
    State(state): State<AppState<T>>,
    query: Result<Query<AccountQuery>, QueryRejection>,
) -> Envelope<AccountSnapshot>
where
    T: TerminalPort + 'static,
{
    normalize("account", async move {
        let Query(query) = query.map_err(bad_query)?;
        let session_id = query.session_id()?;
        state.lifecycle.account_snapshot(&session_id).await
    })
    .await
}

async fn place<T>(
    state: AppState<T>,
    body: Result<Json<TradeRequest>, JsonRejection>,
    side: Option<OrderSide>,
) -> Envelope<OrderOutcome>
where
    T: TerminalPort + 'static,
{
    normalize("place_order", async move {
        let Json(request) = body.map_err(bad_body)?;
        let intent = request.into_intent(side, state.execute_order.settings())?;
        state.execute_order.place_order(intent).await
    })
    .await
}

async fn trade<T>(
    State(state): State<AppState<T>>,
    body: Result<Json<TradeRequest>, JsonRejection>,
) -> Envelope<OrderOutcome>
where
    T: TerminalPort + 'static,
{
    place(state, body, None).await
}

async fn buy<T>(
    State(state): State<AppState<T>>,
    body: Result<Json<TradeRequest>, JsonRejection>,
) -> Envelope<OrderOutcome>
where
    T: TerminalPort + 'static,
{
    place(state, body, Some(OrderSide::Buy)).await
}

async fn sell<T>(
    State(state): State<AppState<T>>,
    body: Result<Json<TradeRequest>, JsonRejection>,
) -> Envelope<OrderOutcome>
where
    T: TerminalPort + 'static,
{
    place(state, body, Some(OrderSide::Sell)).await
}

async fn close_position<T>(
    State(state): State<AppState<T>>,
    body: Result<Json<ClosePositionRequest>, JsonRejection>,
) -> Envelope<OrderOutcome>
where
    T: TerminalPort + 'static,
{
    normalize("close_position", async move {
        let Json(request) = body.map_err(bad_body)?;
        let (session_id, ticket) = request.into_parts()?;
        state.execute_order.close_position(&session_id, ticket).await
    })
    .await
}

async fn open_trades<T>(
    State(state): State<AppState<T>>,
    query: Result<Query<OpenTradesQuery>, QueryRejection>,
) -> Envelope<Vec<Position>>
where
    T: TerminalPort + 'static,
{
    normalize("list_open_positions", async move {
        let Query(query) = query.map_err(bad_query)?;
        let (session_id, symbol) = query.into_parts()?;
        state
            .query_trades
            .list_open_positions(&session_id, symbol)
            .await
    })
    .await
}

async fn closed_trades<T>(
    State(state): State<AppState<T>>,
    query: Result<Query<ClosedTradesQuery>, QueryRejection>,
) -> Envelope<Vec<Deal>>
where
    T: TerminalPort + 'static,
{
    normalize("list_closed_deals", async move {
        let Query(query) = query.map_err(bad_query)?;
        let filter = query.into_filter()?;
        state
            .query_trades
            .list_closed_deals(&filter.session_id, filter.symbol, filter.from, filter.to)
            .await
    })
    .await
}
