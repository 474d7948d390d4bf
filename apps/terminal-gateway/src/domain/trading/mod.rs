//! Trading Bounded Context
//!
//! Order intents, execution outcomes, and the read-only projections of
//! terminal positions and deal history.

pub mod errors;
pub mod value_objects;

pub use errors::IntentError;
pub use value_objects::{
    Deal, ExecutionTag, HistoryWindow, OrderIntent, OrderOutcome, OrderSide, Position,
};
