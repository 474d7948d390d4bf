//! Dependency Injection Container
//!
//! Wires one terminal, the session registry and the use cases from
//! [`Config`].

use std::sync::Arc;

use crate::application::ports::TerminalPort;
use crate::application::services::{SessionRegistry, TerminalBinding};
use crate::application::use_cases::{
    ExecuteOrderUseCase, ExecutionSettings, QueryTradesUseCase, SessionLifecycleUseCase,
};
use crate::config::Config;
use crate::infrastructure::http::AppState;

/// Dependency injection container.
///
/// All use cases share one [`TerminalBinding`], so they agree on which
/// session the terminal is logged in as.
pub struct Container<T>
where
    T: TerminalPort + 'static,
{
    binding: Arc<TerminalBinding<T>>,
    config: Config,
}

impl<T> Container<T>
where
    T: TerminalPort + 'static,
{
    /// Create a container around a terminal.
    pub fn new(terminal: Arc<T>, config: Config) -> Self {
        let binding = TerminalBinding::new(
            terminal,
            Arc::new(SessionRegistry::new()),
            config.terminal.call_timeout(),
        );
        Self {
            binding: Arc::new(binding),
            config,
        }
    }

    /// Get the terminal binding.
    pub fn binding(&self) -> Arc<TerminalBinding<T>> {
        Arc::clone(&self.binding)
    }

    /// Execution settings derived from configuration.
    pub fn execution_settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            tag: self.config.execution.tag,
            comment: self.config.execution.comment.clone(),
            close_comment: self.config.execution.close_comment.clone(),
            deviation: self.config.terminal.price_deviation_points,
        }
    }

    /// Create a `SessionLifecycleUseCase`.
    pub fn session_lifecycle_use_case(&self) -> SessionLifecycleUseCase<T> {
        SessionLifecycleUseCase::new(self.binding())
    }

    /// Create an `ExecuteOrderUseCase`.
    pub fn execute_order_use_case(&self) -> ExecuteOrderUseCase<T> {
        ExecuteOrderUseCase::new(self.binding(), self.execution_settings())
    }

    /// Create a `QueryTradesUseCase`.
    pub fn query_trades_use_case(&self) -> QueryTradesUseCase<T> {
        QueryTradesUseCase::new(
            self.binding(),
            self.config.execution.tag,
            self.config.execution.history_epoch,
        )
    }

    /// HTTP state with every use case wired.
    pub fn app_state(&self) -> AppState<T> {
        AppState {
            lifecycle: Arc::new(self.session_lifecycle_use_case()),
            execute_order: Arc::new(self.execute_order_use_case()),
            query_trades: Arc::new(self.query_trades_use_case()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::ExecutionTag;
    use crate::infrastructure::terminal::PaperTerminal;

    #[test]
    fn settings_follow_config() {
        let mut config = Config::default();
        config.execution.tag = ExecutionTag::new(99);
        config.terminal.price_deviation_points = 5;

        let container = Container::new(Arc::new(PaperTerminal::new()), config);
        let settings = container.execution_settings();

        assert_eq!(settings.tag, ExecutionTag::new(99));
        assert_eq!(settings.deviation, 5);
        assert_eq!(settings.close_comment, "SIGNALIST Bot Close");
    }

    #[test]
    fn use_cases_share_one_registry() {
        let container = Container::new(Arc::new(PaperTerminal::new()), Config::default());
        let state = container.app_state();

        assert_eq!(state.lifecycle.active_sessions(), 0);
        assert!(Arc::ptr_eq(&container.binding(), &container.binding()));
    }
}
