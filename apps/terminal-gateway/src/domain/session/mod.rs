//! Session Bounded Context
//!
//! The gateway's logical view of one authenticated account binding.

mod account_snapshot;
mod session;

pub use account_snapshot::AccountSnapshot;
pub use session::Session;
