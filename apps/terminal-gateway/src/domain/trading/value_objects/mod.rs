//! Trading value objects.

mod deal;
mod execution_tag;
mod history_window;
mod order_intent;
mod order_outcome;
mod order_side;
mod position;

pub use deal::Deal;
pub use execution_tag::ExecutionTag;
pub use history_window::HistoryWindow;
pub use order_intent::OrderIntent;
pub use order_outcome::OrderOutcome;
pub use order_side::OrderSide;
pub use position::Position;
