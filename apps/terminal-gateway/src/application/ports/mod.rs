//! Application Ports
//!
//! Ports define interfaces for interacting with external systems.
//! - **Driven Ports** (Secondary/Outbound): How the gateway uses the terminal

mod terminal_port;

pub use terminal_port::{
    FillPolicy, OrderTime, ResultCode, SymbolInfo, TerminalCommand, TerminalDiagnostic,
    TerminalError, TerminalPort, Tick, TradeAction, TradeResult,
};
