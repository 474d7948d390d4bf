//! Ownership of the process-wide terminal handle.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{OwnedRwLockReadGuard, RwLock, RwLockWriteGuard};

use super::SessionRegistry;
use crate::application::ports::{TerminalError, TerminalPort};
use crate::domain::shared::SessionId;
use crate::error::GatewayError;
use crate::observability;

/// Which session, if any, the terminal is logged in as.
pub type Binding = Option<SessionId>;

/// Shared hold on the binding. No login or logout can run while one is alive.
pub type Attached = OwnedRwLockReadGuard<Binding>;

/// The terminal singleton together with its binding and call deadline.
///
/// Login/logout take the binding exclusively; every other terminal
/// operation holds it shared for its whole duration, so reads and order
/// submissions run concurrently with each other but never interleave with
/// a rebinding.
pub struct TerminalBinding<T>
where
    T: TerminalPort,
{
    terminal: Arc<T>,
    registry: Arc<SessionRegistry>,
    bound: Arc<RwLock<Binding>>,
    call_timeout: Duration,
}

impl<T> TerminalBinding<T>
where
    T: TerminalPort,
{
    /// Create an unbound terminal binding.
    pub fn new(terminal: Arc<T>, registry: Arc<SessionRegistry>, call_timeout: Duration) -> Self {
        Self {
            terminal,
            registry,
            bound: Arc::new(RwLock::new(None)),
            call_timeout,
        }
    }

    /// The terminal handle.
    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    /// The session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Session currently bound to the terminal.
    pub async fn bound_session(&self) -> Binding {
        self.bound.read().await.clone()
    }

    /// Take the binding exclusively for login/logout.
    pub async fn exclusive(&self) -> RwLockWriteGuard<'_, Binding> {
        self.bound.write().await
    }

    /// Hold the binding shared on behalf of `session_id`.
    ///
    /// Fails with `NotConnected` unless the session is registered and is
    /// the one the terminal is logged in as.
    pub async fn attach(&self, session_id: &SessionId) -> Result<Attached, GatewayError> {
        let guard = Arc::clone(&self.bound).read_owned().await;
        if guard.as_ref() != Some(session_id) || !self.registry.contains(session_id) {
            return Err(GatewayError::NotConnected {
                session_id: session_id.clone(),
            });
        }
        Ok(guard)
    }

    /// Run one terminal call under the deadline.
    ///
    /// Bridge failures become `UnexpectedFailure`, an elapsed deadline
    /// becomes `TerminalTimeout`.
    pub async fn call<R, F>(&self, operation: &'static str, call: F) -> Result<R, GatewayError>
    where
        F: Future<Output = Result<R, TerminalError>>,
    {
        let started = Instant::now();
        let result = tokio::time::timeout(self.call_timeout, call).await;
        observability::record_terminal_call(operation, started.elapsed().as_secs_f64());

        match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(operation, error = %e, "Terminal call failed");
                Err(GatewayError::unexpected(e.to_string()))
            }
            Err(_) => {
                let timeout_ms = u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(operation, timeout_ms, "Terminal call timed out");
                observability::record_terminal_timeout(operation);
                Err(GatewayError::TerminalTimeout {
                    operation,
                    timeout_ms,
                })
            }
        }
    }

    /// Run a terminal call on its own task, under the deadline.
    ///
    /// The task is not aborted when the caller goes away or the deadline
    /// passes; an order handed to the terminal always runs to a definitive
    /// answer. The task owns `attached` until then, so the terminal cannot
    /// be rebound to another account while the call is in flight.
    pub async fn call_detached<R, F, Fut>(
        &self,
        operation: &'static str,
        attached: Attached,
        call: F,
    ) -> Result<R, GatewayError>
    where
        T: 'static,
        F: FnOnce(Arc<T>) -> Fut,
        Fut: Future<Output = Result<R, TerminalError>> + Send + 'static,
        R: Send + 'static,
    {
        let pending = call(Arc::clone(&self.terminal));
        let task = tokio::spawn(async move {
            let answer = pending.await;
            drop(attached);
            answer
        });
        self.call(operation, async move {
            task.await.unwrap_or_else(|e| {
                Err(TerminalError::Internal {
                    message: e.to_string(),
                })
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Session;
    use crate::domain::shared::AccountLogin;
    use crate::infrastructure::terminal::PaperTerminal;

    fn binding() -> TerminalBinding<PaperTerminal> {
        TerminalBinding::new(
            Arc::new(PaperTerminal::new()),
            Arc::new(SessionRegistry::new()),
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn attach_requires_bound_and_registered_session() {
        let binding = binding();
        let session = Session::new(AccountLogin::new(1), "Demo", None);
        let id = session.session_id().clone();

        assert!(matches!(
            binding.attach(&id).await,
            Err(GatewayError::NotConnected { .. })
        ));

        binding.registry().register(session);
        *binding.exclusive().await = Some(id.clone());

        assert!(binding.attach(&id).await.is_ok());
        assert!(matches!(
            binding.attach(&SessionId::new("2_Demo")).await,
            Err(GatewayError::NotConnected { .. })
        ));
    }

    #[tokio::test]
    async fn call_maps_bridge_errors_to_unexpected_failure() {
        let binding = binding();
        let result: Result<(), _> = binding
            .call("logout", async {
                Err(TerminalError::Disconnected {
                    message: "pipe closed".to_string(),
                })
            })
            .await;

        match result {
            Err(GatewayError::UnexpectedFailure { message }) => {
                assert!(message.contains("pipe closed"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn call_times_out() {
        let binding = binding();
        let result: Result<(), _> = binding
            .call("current_tick", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(GatewayError::TerminalTimeout {
                operation: "current_tick",
                timeout_ms: 50
            })
        ));
    }

    #[tokio::test]
    async fn detached_submission_holds_binding_until_answered() {
        use crate::application::ports::TerminalCommand;
        use crate::domain::shared::Symbol;
        use crate::domain::trading::{ExecutionTag, OrderSide};
        use rust_decimal_macros::dec;

        let terminal = Arc::new(PaperTerminal::new());
        terminal.set_call_latency("submit_order", Duration::from_millis(120));
        let binding = TerminalBinding::new(
            Arc::clone(&terminal),
            Arc::new(SessionRegistry::new()),
            Duration::from_millis(20),
        );
        let session = Session::new(AccountLogin::new(1), "Demo", None);
        let id = session.session_id().clone();
        binding.registry().register(session);
        *binding.exclusive().await = Some(id.clone());

        let command = TerminalCommand::market_deal(
            Symbol::new("EURUSD"),
            OrderSide::Buy,
            dec!(0.1),
            dec!(1.1),
            20,
            ExecutionTag::new(2025),
            "test",
        );
        let attached = binding.attach(&id).await.unwrap();

        let result = binding
            .call_detached("submit_order", attached, move |terminal| async move {
                terminal.submit_order(command).await
            })
            .await;
        assert!(matches!(result, Err(GatewayError::TerminalTimeout { .. })));
        assert!(terminal.submitted().is_empty());

        // Rebinding waits for the terminal's answer.
        let bound = binding.exclusive().await;
        assert_eq!(terminal.submitted().len(), 1);
        assert_eq!(*bound, Some(id));
    }
}
