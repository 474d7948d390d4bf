//! Session Lifecycle Use Case
//!
//! Owns the rule that the terminal is logged in as at most one session:
//! a connect for a different account while another is bound is rejected
//! with `TerminalBusy`, never silently preempted.

use std::sync::Arc;

use crate::application::services::TerminalBinding;
use crate::application::ports::TerminalPort;
use crate::domain::session::{AccountSnapshot, Session};
use crate::domain::shared::{AccountLogin, SessionId};
use crate::error::GatewayError;
use crate::observability;

/// Use case for connecting, disconnecting and reading account state.
pub struct SessionLifecycleUseCase<T>
where
    T: TerminalPort,
{
    binding: Arc<TerminalBinding<T>>,
}

impl<T> SessionLifecycleUseCase<T>
where
    T: TerminalPort,
{
    /// Create a new SessionLifecycleUseCase.
    pub const fn new(binding: Arc<TerminalBinding<T>>) -> Self {
        Self { binding }
    }

    /// Start the terminal.
    ///
    /// # Errors
    ///
    /// `TerminalUnavailable` with the terminal's diagnostic when it cannot
    /// start.
    pub async fn initialize(&self) -> Result<(), GatewayError> {
        let terminal = self.binding.terminal();
        if self.binding.call("initialize", terminal.initialize()).await? {
            return Ok(());
        }
        let diagnostic = self.binding.call("last_error", terminal.last_error()).await?;
        tracing::error!(code = diagnostic.code, message = %diagnostic.message, "Terminal initialization failed");
        Err(GatewayError::TerminalUnavailable {
            code: diagnostic.code,
            message: diagnostic.message,
        })
    }

    /// Log in and register the session.
    ///
    /// When the account snapshot cannot be read (no answer, deadline or
    /// bridge failure) the session stays registered and bound and
    /// `SnapshotUnavailable` is returned. When the login call itself fails
    /// the terminal's login state is unknown, so the binding and any
    /// previous entry for this id are dropped.
    ///
    /// # Errors
    ///
    /// `TerminalBusy` when another account holds the terminal,
    /// `AuthenticationError` when the terminal refuses the credentials,
    /// `SnapshotUnavailable` as above.
    pub async fn connect(
        &self,
        login: AccountLogin,
        secret: &str,
        server: &str,
    ) -> Result<Session, GatewayError> {
        let session_id = Session::derive_id(login, server);
        let registry = self.binding.registry();
        let terminal = self.binding.terminal();

        let mut bound = self.binding.exclusive().await;
        if let Some(current) = bound.as_ref()
            && current != &session_id
        {
            tracing::warn!(session_id = %session_id, bound = %current, "Terminal busy, connect rejected");
            return Err(GatewayError::TerminalBusy {
                bound: current.clone(),
            });
        }

        self.initialize().await?;

        let accepted = match self
            .binding
            .call("login", terminal.login(login, secret, server))
            .await
        {
            Ok(accepted) => accepted,
            Err(e) => {
                *bound = None;
                registry.remove(&session_id);
                observability::set_active_sessions(registry.len());
                tracing::warn!(session_id = %session_id, error = %e, "Login call failed, terminal unbound");
                return Err(e);
            }
        };

        if !accepted {
            let diagnostic = self.binding.call("last_error", terminal.last_error()).await?;
            if let Err(e) = self.binding.call("logout", terminal.logout()).await {
                tracing::warn!(error = %e, "Logout after failed login failed");
            }
            *bound = None;
            registry.remove(&session_id);
            observability::set_active_sessions(registry.len());
            tracing::warn!(session_id = %session_id, code = diagnostic.code, "Login rejected");
            return Err(GatewayError::AuthenticationError {
                code: diagnostic.code,
                message: diagnostic.message,
            });
        }
        *bound = Some(session_id.clone());

        let snapshot = self
            .binding
            .call("account_snapshot", terminal.account_snapshot())
            .await;
        let account = snapshot.as_ref().ok().cloned().flatten();
        let session = Session::new(login, server, account);
        registry.register(session.clone());
        observability::set_active_sessions(registry.len());
        drop(bound);

        match snapshot {
            Ok(Some(_)) => {
                tracing::info!(session_id = %session_id, "Session connected");
                Ok(session)
            }
            Ok(None) => {
                tracing::warn!(session_id = %session_id, "Connected without account snapshot");
                Err(GatewayError::SnapshotUnavailable { session_id })
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Account snapshot read failed after login");
                Err(GatewayError::SnapshotUnavailable { session_id })
            }
        }
    }

    /// Log out and forget the session.
    ///
    /// The registry entry is removed even when the terminal logout fails;
    /// the logout failure is still returned.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` when the id is not registered.
    pub async fn disconnect(&self, session_id: &SessionId) -> Result<(), GatewayError> {
        let registry = self.binding.registry();
        let mut bound = self.binding.exclusive().await;

        if !registry.contains(session_id) {
            return Err(GatewayError::SessionNotFound {
                session_id: session_id.clone(),
            });
        }

        let mut result = Ok(());
        if bound.as_ref() == Some(session_id) {
            result = self
                .binding
                .call("logout", self.binding.terminal().logout())
                .await;
            *bound = None;
        }
        registry.remove(session_id);
        observability::set_active_sessions(registry.len());
        tracing::info!(session_id = %session_id, "Session disconnected");
        result
    }

    /// Re-read live account figures and cache them on the session.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` for an unknown id, `NotConnected` when the session
    /// is not the one bound to the terminal.
    pub async fn account_snapshot(
        &self,
        session_id: &SessionId,
    ) -> Result<AccountSnapshot, GatewayError> {
        let registry = self.binding.registry();
        if !registry.contains(session_id) {
            return Err(GatewayError::SessionNotFound {
                session_id: session_id.clone(),
            });
        }

        let _bound = self.binding.attach(session_id).await?;
        let snapshot = self
            .binding
            .call("account_snapshot", self.binding.terminal().account_snapshot())
            .await?
            .ok_or_else(|| GatewayError::SnapshotUnavailable {
                session_id: session_id.clone(),
            })?;
        registry.refresh_account(session_id, snapshot.clone());
        Ok(snapshot)
    }

    /// Number of registered sessions.
    pub fn active_sessions(&self) -> usize {
        self.binding.registry().len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::services::SessionRegistry;
    use crate::infrastructure::terminal::PaperTerminal;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn snapshot(balance: Decimal) -> AccountSnapshot {
        AccountSnapshot {
            balance,
            equity: balance,
            margin: Decimal::ZERO,
            free_margin: balance,
            margin_level: Decimal::ZERO,
            currency: "USD".to_string(),
            leverage: 100,
        }
    }

    fn setup() -> (Arc<PaperTerminal>, SessionLifecycleUseCase<PaperTerminal>) {
        setup_with_timeout(Duration::from_secs(1))
    }

    fn setup_with_timeout(
        call_timeout: Duration,
    ) -> (Arc<PaperTerminal>, SessionLifecycleUseCase<PaperTerminal>) {
        let terminal = Arc::new(
            PaperTerminal::new()
                .with_account(123, "x", "Demo", snapshot(dec!(1000)))
                .with_account(456, "y", "Demo", snapshot(dec!(50))),
        );
        let binding = TerminalBinding::new(
            Arc::clone(&terminal),
            Arc::new(SessionRegistry::new()),
            call_timeout,
        );
        (terminal, SessionLifecycleUseCase::new(Arc::new(binding)))
    }

    #[tokio::test]
    async fn connect_registers_session_with_snapshot() {
        let (_, use_case) = setup();

        let session = use_case
            .connect(AccountLogin::new(123), "x", "Demo")
            .await
            .unwrap();

        assert_eq!(session.session_id().as_str(), "123_Demo");
        assert_eq!(session.account().unwrap().balance, dec!(1000));
        assert_eq!(use_case.active_sessions(), 1);
    }

    #[tokio::test]
    async fn connect_with_bad_secret_logs_out_and_stays_unbound() {
        let (terminal, use_case) = setup();

        let err = use_case
            .connect(AccountLogin::new(123), "wrong", "Demo")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::AuthenticationError { code: -6, .. }));
        assert!(terminal.calls().contains(&"logout"));
        assert_eq!(use_case.active_sessions(), 0);
        assert!(use_case.binding.bound_session().await.is_none());
    }

    #[tokio::test]
    async fn connect_fails_when_terminal_cannot_start() {
        let (terminal, use_case) = setup();
        terminal.set_initialize_result(false);

        let err = use_case
            .connect(AccountLogin::new(123), "x", "Demo")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::TerminalUnavailable { .. }));
        assert!(!terminal.calls().contains(&"login"));
    }

    #[tokio::test]
    async fn second_account_is_rejected_while_bound() {
        let (terminal, use_case) = setup();
        use_case.connect(AccountLogin::new(123), "x", "Demo").await.unwrap();

        let err = use_case
            .connect(AccountLogin::new(456), "y", "Demo")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::TerminalBusy { ref bound } if bound.as_str() == "123_Demo"));
        assert_eq!(terminal.logged_in(), Some(AccountLogin::new(123)));
    }

    #[tokio::test]
    async fn concurrent_connects_for_different_accounts_bind_one() {
        let (terminal, use_case) = setup();
        terminal.set_latency(Duration::from_millis(20));

        let (a, b) = tokio::join!(
            use_case.connect(AccountLogin::new(123), "x", "Demo"),
            use_case.connect(AccountLogin::new(456), "y", "Demo"),
        );

        let (winner, loser) = match (a, b) {
            (Ok(session), Err(e)) | (Err(e), Ok(session)) => (session, e),
            other => panic!("expected exactly one winner: {other:?}"),
        };
        assert!(matches!(loser, GatewayError::TerminalBusy { ref bound } if bound == winner.session_id()));
        assert_eq!(terminal.logged_in(), Some(winner.login()));
        assert_eq!(use_case.active_sessions(), 1);
        assert_eq!(
            use_case.binding.bound_session().await.as_ref(),
            Some(winner.session_id())
        );
    }

    #[tokio::test]
    async fn failed_login_call_on_reconnect_unbinds() {
        let (terminal, use_case) = setup_with_timeout(Duration::from_millis(50));
        use_case.connect(AccountLogin::new(123), "x", "Demo").await.unwrap();
        terminal.set_call_latency("login", Duration::from_millis(200));

        let err = use_case
            .connect(AccountLogin::new(123), "x", "Demo")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::TerminalTimeout { operation: "login", .. }));
        assert!(use_case.binding.bound_session().await.is_none());
        assert_eq!(use_case.active_sessions(), 0);
    }

    #[tokio::test]
    async fn snapshot_timeout_at_connect_is_snapshot_unavailable() {
        let (terminal, use_case) = setup_with_timeout(Duration::from_millis(50));
        terminal.set_call_latency("account_snapshot", Duration::from_millis(200));

        let err = use_case
            .connect(AccountLogin::new(123), "x", "Demo")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::SnapshotUnavailable { .. }));
        assert_eq!(use_case.active_sessions(), 1);
        assert_eq!(
            use_case.binding.bound_session().await,
            Some(SessionId::new("123_Demo"))
        );
    }

    #[tokio::test]
    async fn reconnecting_same_account_overwrites_entry() {
        let (_, use_case) = setup();
        use_case.connect(AccountLogin::new(123), "x", "Demo").await.unwrap();
        use_case.connect(AccountLogin::new(123), "x", "Demo").await.unwrap();

        assert_eq!(use_case.active_sessions(), 1);
    }

    #[tokio::test]
    async fn missing_snapshot_still_registers_session() {
        let (terminal, use_case) = setup();
        terminal.set_snapshot_available(false);

        let err = use_case
            .connect(AccountLogin::new(123), "x", "Demo")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::SnapshotUnavailable { .. }));
        assert_eq!(use_case.active_sessions(), 1);
        assert_eq!(
            use_case.binding.bound_session().await,
            Some(SessionId::new("123_Demo"))
        );
    }

    #[tokio::test]
    async fn disconnect_twice_fails_with_not_found() {
        let (terminal, use_case) = setup();
        let id = use_case
            .connect(AccountLogin::new(123), "x", "Demo")
            .await
            .unwrap()
            .session_id()
            .clone();

        use_case.disconnect(&id).await.unwrap();
        assert!(terminal.logged_in().is_none());

        let err = use_case.disconnect(&id).await.unwrap_err();
        assert!(matches!(err, GatewayError::SessionNotFound { .. }));
    }

    #[tokio::test]
    async fn disconnect_frees_terminal_for_another_account() {
        let (_, use_case) = setup();
        let id = SessionId::new("123_Demo");
        use_case.connect(AccountLogin::new(123), "x", "Demo").await.unwrap();
        use_case.disconnect(&id).await.unwrap();

        let session = use_case
            .connect(AccountLogin::new(456), "y", "Demo")
            .await
            .unwrap();
        assert_eq!(session.session_id().as_str(), "456_Demo");
    }

    #[tokio::test]
    async fn account_snapshot_reads_live_figures() {
        let (_, use_case) = setup();
        let session = use_case
            .connect(AccountLogin::new(123), "x", "Demo")
            .await
            .unwrap();

        let snapshot = use_case.account_snapshot(session.session_id()).await.unwrap();
        assert_eq!(snapshot.currency, "USD");
    }

    #[tokio::test]
    async fn account_snapshot_for_unknown_session() {
        let (terminal, use_case) = setup();

        let err = use_case
            .account_snapshot(&SessionId::new("9_Nowhere"))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::SessionNotFound { .. }));
        assert!(terminal.calls().is_empty());
    }
}
