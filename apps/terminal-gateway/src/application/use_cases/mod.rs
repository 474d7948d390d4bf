//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod execute_order;
mod query_trades;
mod session_lifecycle;

pub use execute_order::{ExecuteOrderUseCase, ExecutionSettings};
pub use query_trades::QueryTradesUseCase;
pub use session_lifecycle::SessionLifecycleUseCase;
