//! Domain Layer
//!
//! The innermost layer with zero infrastructure dependencies.
//!
//! # Bounded Contexts
//!
//! - [`session`]: Logical account sessions and account snapshots
//! - [`trading`]: Order intents, outcomes, positions and deals

pub mod session;
pub mod shared;
pub mod trading;
