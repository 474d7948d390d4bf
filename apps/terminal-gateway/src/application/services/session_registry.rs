//! In-memory session registry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::session::{AccountSnapshot, Session};
use crate::domain::shared::SessionId;

/// Map of session id to session metadata.
///
/// All access goes through one mutex that is never held across a terminal
/// call, so slow terminal I/O does not block unrelated lookups.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a session, replacing any entry with the same id.
    pub fn register(&self, session: Session) -> Option<Session> {
        self.lock().insert(session.session_id().clone(), session)
    }

    /// Look up a session.
    #[must_use]
    pub fn get(&self, session_id: &SessionId) -> Option<Session> {
        self.lock().get(session_id).cloned()
    }

    /// Whether a session is registered.
    #[must_use]
    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.lock().contains_key(session_id)
    }

    /// Remove a session.
    pub fn remove(&self, session_id: &SessionId) -> Option<Session> {
        self.lock().remove(session_id)
    }

    /// Store a fresh account snapshot. Returns `false` if the session is gone.
    pub fn refresh_account(&self, session_id: &SessionId, snapshot: AccountSnapshot) -> bool {
        match self.lock().get_mut(session_id) {
            Some(session) => {
                session.refresh_account(snapshot);
                true
            }
            None => false,
        }
    }

    /// Number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::AccountLogin;
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

    #[test]
    fn register_and_get() {
        let registry = SessionRegistry::new();
        let session = Session::new(AccountLogin::new(123), "Demo", None);
        let id = session.session_id().clone();

        assert!(registry.register(session).is_none());

        assert!(registry.contains(&id));
        assert_eq!(registry.get(&id).unwrap().server(), "Demo");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_same_pair_overwrites() {
        let registry = SessionRegistry::new();
        registry.register(Session::new(AccountLogin::new(1), "Demo", Some(snapshot(dec!(1)))));
        let previous =
            registry.register(Session::new(AccountLogin::new(1), "Demo", Some(snapshot(dec!(2)))));

        assert!(previous.is_some());
        assert_eq!(registry.len(), 1);
        let id = SessionId::new("1_Demo");
        assert_eq!(registry.get(&id).unwrap().account().unwrap().balance, dec!(2));
    }

    #[test]
    fn remove_is_not_repeatable() {
        let registry = SessionRegistry::new();
        registry.register(Session::new(AccountLogin::new(5), "Live", None));
        let id = SessionId::new("5_Live");

        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn refresh_account_on_missing_session() {
        let registry = SessionRegistry::new();
        assert!(!registry.refresh_account(&SessionId::new("nope"), snapshot(dec!(1))));
    }
}
