//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.

mod identifiers;
mod symbol;
mod timestamp;

pub use identifiers::{AccountLogin, DealNumber, OrderNumber, SessionId, Ticket};
pub use symbol::Symbol;
pub use timestamp::Timestamp;
