//! Terminal adapters.

mod paper;

pub use paper::{PaperTerminal, SubmitBehavior};
