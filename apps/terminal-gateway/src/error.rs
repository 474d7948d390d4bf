//! Error taxonomy for the gateway.
//!
//! Every collaborator failure is translated into a [`GatewayError`] at the
//! point of call; nothing raw from the terminal crosses the core boundary.
//!
//! # HTTP Status Codes
//!
//! | Reason | Status |
//! |--------|--------|
//! | `InvalidOrderIntent`, `InvalidRequest` | 400 |
//! | `AuthenticationError` | 401 |
//! | `NotConnected` | 403 |
//! | `NotFoundError`, `PositionNotFound`, `UnknownSymbol` | 404 |
//! | `TerminalBusy` | 409 |
//! | `SymbolUnavailable`, `QuoteUnavailable`, `OrderRejected` | 422 |
//! | `SnapshotUnavailable`, `SubmissionFailed`, `TerminalUnavailable` | 502 |
//! | `TerminalTimeout` | 504 |
//! | `UnexpectedFailure` | 500 |

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::shared::{SessionId, Symbol, Ticket};
use crate::domain::trading::IntentError;

/// Stable error codes surfaced in failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Session unknown or not bound to the terminal.
    NotConnected,
    /// Session id not registered.
    NotFoundError,
    /// Terminal refused the credentials.
    AuthenticationError,
    /// Terminal could not be initialised.
    TerminalUnavailable,
    /// Terminal is bound to a different account.
    TerminalBusy,
    /// Account figures could not be read.
    SnapshotUnavailable,
    /// Symbol does not exist on the terminal.
    UnknownSymbol,
    /// Symbol exists but could not be made tradable.
    SymbolUnavailable,
    /// No current tick for the symbol.
    QuoteUnavailable,
    /// Order intent failed validation.
    InvalidOrderIntent,
    /// Transport-level request is malformed.
    InvalidRequest,
    /// Terminal returned no result for an order.
    SubmissionFailed,
    /// Terminal returned a non-done result code.
    OrderRejected,
    /// No open position with the ticket.
    PositionNotFound,
    /// Terminal call exceeded its deadline.
    TerminalTimeout,
    /// Anything else.
    UnexpectedFailure,
}

impl ErrorCode {
    /// HTTP status for this error.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidOrderIntent | Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::AuthenticationError => StatusCode::UNAUTHORIZED,
            Self::NotConnected => StatusCode::FORBIDDEN,
            Self::NotFoundError | Self::PositionNotFound | Self::UnknownSymbol => {
                StatusCode::NOT_FOUND
            }
            Self::TerminalBusy => StatusCode::CONFLICT,
            Self::SymbolUnavailable | Self::QuoteUnavailable | Self::OrderRejected => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::SnapshotUnavailable | Self::SubmissionFailed | Self::TerminalUnavailable => {
                StatusCode::BAD_GATEWAY
            }
            Self::TerminalTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::UnexpectedFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Reason string placed in the envelope's `error` field.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotConnected => "NotConnected",
            Self::NotFoundError => "NotFoundError",
            Self::AuthenticationError => "AuthenticationError",
            Self::TerminalUnavailable => "TerminalUnavailable",
            Self::TerminalBusy => "TerminalBusy",
            Self::SnapshotUnavailable => "SnapshotUnavailable",
            Self::UnknownSymbol => "UnknownSymbol",
            Self::SymbolUnavailable => "SymbolUnavailable",
            Self::QuoteUnavailable => "QuoteUnavailable",
            Self::InvalidOrderIntent => "InvalidOrderIntent",
            Self::InvalidRequest => "InvalidRequest",
            Self::SubmissionFailed => "SubmissionFailed",
            Self::OrderRejected => "OrderRejected",
            Self::PositionNotFound => "PositionNotFound",
            Self::TerminalTimeout => "TerminalTimeout",
            Self::UnexpectedFailure => "UnexpectedFailure",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Gateway failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Session is not registered or not the one bound to the terminal.
    #[error("Session {session_id} is not connected")]
    NotConnected {
        /// Requested session.
        session_id: SessionId,
    },

    /// Session id is not registered.
    #[error("Connection {session_id} not found")]
    SessionNotFound {
        /// Requested session.
        session_id: SessionId,
    },

    /// Terminal rejected the login.
    #[error("Login failed: ({code}) {message}")]
    AuthenticationError {
        /// Terminal diagnostic code.
        code: i64,
        /// Terminal diagnostic text.
        message: String,
    },

    /// Terminal could not be initialised.
    #[error("Terminal initialization failed: ({code}) {message}")]
    TerminalUnavailable {
        /// Terminal diagnostic code.
        code: i64,
        /// Terminal diagnostic text.
        message: String,
    },

    /// Terminal is bound to another account.
    #[error("Terminal is bound to session {bound}")]
    TerminalBusy {
        /// Session currently holding the terminal.
        bound: SessionId,
    },

    /// Account figures could not be read.
    #[error("Failed to get account info for {session_id}")]
    SnapshotUnavailable {
        /// Session whose snapshot was requested.
        session_id: SessionId,
    },

    /// Symbol lookup returned nothing.
    #[error("Symbol {symbol} not found")]
    UnknownSymbol {
        /// Requested symbol.
        symbol: Symbol,
    },

    /// Symbol could not be made visible.
    #[error("Failed to select symbol {symbol}")]
    SymbolUnavailable {
        /// Requested symbol.
        symbol: Symbol,
    },

    /// No tick available.
    #[error("Failed to get tick for {symbol}")]
    QuoteUnavailable {
        /// Requested symbol.
        symbol: Symbol,
    },

    /// Order intent failed validation.
    #[error("Invalid order intent: {0}")]
    InvalidOrderIntent(#[from] IntentError),

    /// Malformed request at the transport boundary.
    #[error("{message}")]
    InvalidRequest {
        /// What is wrong with the request.
        message: String,
    },

    /// Terminal returned no result.
    #[error("{message}")]
    SubmissionFailed {
        /// Which submission failed.
        message: String,
    },

    /// Terminal returned a non-done code.
    #[error("Order failed: {code} - {comment}")]
    OrderRejected {
        /// Terminal result code.
        code: u32,
        /// Terminal comment, verbatim.
        comment: String,
    },

    /// No open position with the ticket.
    #[error("Position {ticket} not found")]
    PositionNotFound {
        /// Requested ticket.
        ticket: Ticket,
    },

    /// Terminal call exceeded its deadline.
    #[error("Terminal call '{operation}' timed out after {timeout_ms}ms")]
    TerminalTimeout {
        /// Terminal operation name.
        operation: &'static str,
        /// Deadline in milliseconds.
        timeout_ms: u64,
    },

    /// Unclassified failure.
    #[error("{message}")]
    UnexpectedFailure {
        /// Failure description.
        message: String,
    },
}

impl GatewayError {
    /// Stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotConnected { .. } => ErrorCode::NotConnected,
            Self::SessionNotFound { .. } => ErrorCode::NotFoundError,
            Self::AuthenticationError { .. } => ErrorCode::AuthenticationError,
            Self::TerminalUnavailable { .. } => ErrorCode::TerminalUnavailable,
            Self::TerminalBusy { .. } => ErrorCode::TerminalBusy,
            Self::SnapshotUnavailable { .. } => ErrorCode::SnapshotUnavailable,
            Self::UnknownSymbol { .. } => ErrorCode::UnknownSymbol,
            Self::SymbolUnavailable { .. } => ErrorCode::SymbolUnavailable,
            Self::QuoteUnavailable { .. } => ErrorCode::QuoteUnavailable,
            Self::InvalidOrderIntent(_) => ErrorCode::InvalidOrderIntent,
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            Self::SubmissionFailed { .. } => ErrorCode::SubmissionFailed,
            Self::OrderRejected { .. } => ErrorCode::OrderRejected,
            Self::PositionNotFound { .. } => ErrorCode::PositionNotFound,
            Self::TerminalTimeout { .. } => ErrorCode::TerminalTimeout,
            Self::UnexpectedFailure { .. } => ErrorCode::UnexpectedFailure,
        }
    }

    /// Terminal diagnostic code, when the failure carries one.
    #[must_use]
    pub fn terminal_code(&self) -> Option<i64> {
        match self {
            Self::AuthenticationError { code, .. } | Self::TerminalUnavailable { code, .. } => {
                Some(*code)
            }
            Self::OrderRejected { code, .. } => Some(i64::from(*code)),
            _ => None,
        }
    }

    /// Missing or malformed transport input.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Unclassified failure.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedFailure {
            message: message.into(),
        }
    }
}
