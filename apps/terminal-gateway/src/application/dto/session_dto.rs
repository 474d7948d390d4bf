//! Session DTOs

use serde::{Deserialize, Serialize};

use crate::domain::session::{AccountSnapshot, Session};
use crate::domain::shared::{AccountLogin, Timestamp};

/// Session as returned by `connect`.
///
/// Account figures are flattened next to the session id so a caller gets
/// `{session_id, balance, equity, ...}` in one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummaryDto {
    /// Session key to pass to every later call.
    pub session_id: String,
    /// Account login.
    pub login: AccountLogin,
    /// Trade server.
    pub server: String,
    /// When the login succeeded.
    pub connected_at: Timestamp,
    /// Account figures at connect time.
    #[serde(flatten)]
    pub account: Option<AccountSnapshot>,
}

impl SessionSummaryDto {
    /// Create from a domain session.
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            login: session.login(),
            server: session.server().to_string(),
            connected_at: session.connected_at(),
            account: session.account().cloned(),
        }
    }
}

/// Acknowledgement for operations with no payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectedDto {
    /// Session that was removed.
    pub session_id: String,
}
