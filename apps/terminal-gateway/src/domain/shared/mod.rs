//! Shared Domain Types
//!
//! Value objects shared across bounded contexts.

pub mod value_objects;

pub use value_objects::{AccountLogin, DealNumber, OrderNumber, SessionId, Symbol, Ticket, Timestamp};
