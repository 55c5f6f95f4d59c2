//! Session Types and Structures
//!
//! [`Session`] is the identity record shared by every view. The password typed
//! during login lives only in [`CredentialDraft`], so the persisted
//! [`SessionSnapshot`] cannot carry it.

use licensify_core::Role;
use serde::{Deserialize, Serialize};

/// Who is logged in and with what role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_logged_in: bool,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in_seconds: Option<u64>,
    pub role: Option<Role>,
}

impl Session {
    /// `is_logged_in` implies a role and a non-empty token
    pub fn is_consistent(&self) -> bool {
        !self.is_logged_in
            || (self.role.is_some() && self.token.as_deref().is_some_and(|t| !t.is_empty()))
    }

    /// Role of an authenticated session, `None` when logged out
    pub fn active_role(&self) -> Option<Role> {
        if self.is_logged_in {
            self.role
        } else {
            None
        }
    }

    pub fn is_admin(&self) -> bool {
        self.active_role() == Some(Role::Admin)
    }
}

/// Field of the in-progress login form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Email,
    Password,
}

/// Unauthenticated login form state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialDraft {
    pub email: String,
    pub password: String,
}

/// Everything needed to establish a session after a verified login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedSession {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub token: String,
    pub refresh_token: String,
    pub expires_in_seconds: u64,
    pub role: Role,
}

/// Persisted subset of the session. This struct is the allowlist: adding a
/// field to [`Session`] does not persist it until it is added here too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub is_logged_in: bool,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(rename = "expiresIn")]
    pub expires_in_seconds: Option<u64>,
    pub role: Option<Role>,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            is_logged_in: session.is_logged_in,
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            display_name: session.display_name.clone(),
            token: session.token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_in_seconds: session.expires_in_seconds,
            role: session.role,
        }
    }
}

impl From<SessionSnapshot> for Session {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            is_logged_in: snapshot.is_logged_in,
            user_id: snapshot.user_id,
            email: snapshot.email,
            display_name: snapshot.display_name,
            token: snapshot.token,
            refresh_token: snapshot.refresh_token,
            expires_in_seconds: snapshot.expires_in_seconds,
            role: snapshot.role,
        }
    }
}

/// On-disk envelope of the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub state: SessionSnapshot,
    pub version: u32,
}

impl PersistedSession {
    pub const CURRENT_VERSION: u32 = 0;

    pub fn new(state: SessionSnapshot) -> Self {
        Self {
            state,
            version: Self::CURRENT_VERSION,
        }
    }
}
