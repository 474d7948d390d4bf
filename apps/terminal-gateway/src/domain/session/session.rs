//! Session entity.

use serde::{Deserialize, Serialize};

use super::AccountSnapshot;
use crate::domain::shared::{AccountLogin, SessionId, Timestamp};

/// One authenticated account binding.
///
/// Created on successful login, mutated only by snapshot refreshes and
/// destroyed on explicit disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    session_id: SessionId,
    login: AccountLogin,
    server: String,
    connected_at: Timestamp,
    account: Option<AccountSnapshot>,
}

impl Session {
    /// Create a session for a freshly authenticated account.
    #[must_use]
    pub fn new(login: AccountLogin, server: impl Into<String>, account: Option<AccountSnapshot>) -> Self {
        let server = server.into();
        Self {
            session_id: Self::derive_id(login, &server),
            login,
            server,
            connected_at: Timestamp::now(),
            account,
        }
    }

    /// Deterministic session key for an account/server pair.
    #[must_use]
    pub fn derive_id(login: AccountLogin, server: &str) -> SessionId {
        SessionId::new(format!("{login}_{server}"))
    }

    /// Session key.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Account login.
    #[must_use]
    pub const fn login(&self) -> AccountLogin {
        self.login
    }

    /// Trade server name.
    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// When the login succeeded.
    #[must_use]
    pub const fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    /// Last account snapshot, if one could be read.
    #[must_use]
    pub const fn account(&self) -> Option<&AccountSnapshot> {
        self.account.as_ref()
    }

    /// Replace the cached snapshot. Leaves `connected_at` untouched.
    pub fn refresh_account(&mut self, snapshot: AccountSnapshot) {
        self.account = Some(snapshot);
    }
}
