//! Application Services
//!
//! Shared state the use cases coordinate through: the session registry and
//! the terminal binding.

mod session_registry;
mod terminal_binding;

pub use session_registry::SessionRegistry;
pub use terminal_binding::{Attached, Binding, TerminalBinding};
