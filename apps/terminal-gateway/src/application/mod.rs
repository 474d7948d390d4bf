//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for interacting with the trading terminal
//! - **Services**: Session registry and terminal binding
//! - **Use Cases**: Session lifecycle, order execution and trade queries
//! - **DTOs**: Result envelope and session summaries

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
