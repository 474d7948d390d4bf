// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Terminal Gateway - Rust Core Library
//!
//! Session and order-execution core in front of a single trading terminal.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core types with no I/O
//!   - `session`: `Session`, `AccountSnapshot`, session id derivation
//!   - `trading`: `OrderIntent`, `OrderOutcome`, `Position`, `Deal`, `ExecutionTag`
//!   - `shared`: identifiers, `Symbol`, `Timestamp`
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `TerminalPort`, the terminal capability
//!   - `services`: `SessionRegistry`, `TerminalBinding`
//!   - `use_cases`: `SessionLifecycle`, `ExecuteOrder`, `QueryTrades`
//!   - `dto`: the result envelope and normalizer
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `terminal`: simulated paper terminal
//!   - `http`: axum REST API
//!   - `config`: Dependency injection container

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core types with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// YAML configuration loading.
pub mod config;

/// Error taxonomy.
pub mod error;

/// Prometheus metrics.
pub mod observability;

/// Logging and trace export setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::dto::{Envelope, normalize};
pub use application::ports::TerminalPort;
pub use application::use_cases::{
    ExecuteOrderUseCase, ExecutionSettings, QueryTradesUseCase, SessionLifecycleUseCase,
};
pub use domain::session::{AccountSnapshot, Session};
pub use domain::trading::{Deal, OrderIntent, OrderOutcome, OrderSide, Position};
pub use error::{ErrorCode, GatewayError};
