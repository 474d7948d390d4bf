//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - **Driven Adapters (Outbound)**
//!   - `terminal/`: simulated terminal implementing `TerminalPort`
//!
//! - **Driver Adapters (Inbound)**
//!   - `http/`: REST API controllers
//!
//! - **Wiring**
//!   - `config/`: dependency injection container

pub mod config;
pub mod http;
pub mod terminal;
