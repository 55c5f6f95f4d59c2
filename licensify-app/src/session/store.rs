//! Session Store - single source of truth for the current identity
//!
//! The store has exactly one writer (whoever holds `&mut SessionStore`: the
//! login and logout flows) and any number of readers through [`subscribe`].
//! Every mutation writes the sanitized snapshot first. Only a successful save
//! changes the in-memory state and notifies subscribers.
//!
//! [`subscribe`]: SessionStore::subscribe

use super::storage::SessionPersistence;
use super::types::{CommittedSession, CredentialDraft, CredentialField, Session, SessionSnapshot};
use licensify_core::{validation_error, LicensifyResult};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct SessionStore {
    session: Session,
    draft: CredentialDraft,
    persistence: Arc<dyn SessionPersistence>,
    notifier: watch::Sender<Session>,
}

impl SessionStore {
    /// Restore the last persisted snapshot.
    ///
    /// The restored session is an unverified guess: no expiry check happens
    /// here, a stale token is only discovered when the backend rejects it.
    pub fn open(persistence: Arc<dyn SessionPersistence>) -> Self {
        let session = match persistence.load() {
            Ok(Some(snapshot)) => {
                let session = Session::from(snapshot);
                if session.is_consistent() {
                    debug!(
                        logged_in = session.is_logged_in,
                        user_id = %session.user_id,
                        "Restored session snapshot"
                    );
                    session
                } else {
                    warn!("Discarding persisted session that is logged in without role or token");
                    Session::default()
                }
            }
            Ok(None) => Session::default(),
            Err(e) => {
                e.log();
                warn!("Ignoring unreadable session snapshot");
                Session::default()
            }
        };

        let draft = CredentialDraft {
            email: session.email.clone(),
            password: String::new(),
        };
        let (notifier, _) = watch::channel(session.clone());

        Self {
            session,
            draft,
            persistence,
            notifier,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn draft(&self) -> &CredentialDraft {
        &self.draft
    }

    /// Receiver that observes every committed mutation
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.notifier.subscribe()
    }

    /// Update the in-progress login form.
    ///
    /// The email draft is the session's email field; the password never leaves
    /// the draft.
    pub fn set_credential_draft(
        &mut self,
        field: CredentialField,
        value: impl Into<String>,
    ) -> LicensifyResult<()> {
        let value = value.into();
        let mut session = self.session.clone();
        let mut draft = self.draft.clone();
        match field {
            CredentialField::Email => {
                draft.email = value.clone();
                session.email = value;
            }
            CredentialField::Password => draft.password = value,
        }
        self.replace(session, draft)
    }

    /// Store a verified session, replacing whatever was there before
    pub fn commit_session(&mut self, data: CommittedSession) -> LicensifyResult<()> {
        if data.token.trim().is_empty() {
            return Err(validation_error!(
                "session token must not be empty",
                "token",
                "session_store"
            ));
        }
        if data.user_id.trim().is_empty() {
            return Err(validation_error!(
                "session user id must not be empty",
                "user_id",
                "session_store"
            ));
        }

        let session = Session {
            is_logged_in: true,
            user_id: data.user_id,
            email: data.email,
            display_name: data.display_name,
            token: Some(data.token),
            refresh_token: Some(data.refresh_token),
            expires_in_seconds: Some(data.expires_in_seconds),
            role: Some(data.role),
        };
        let draft = CredentialDraft {
            email: session.email.clone(),
            password: String::new(),
        };

        self.replace(session, draft)?;
        info!(
            user_id = %self.session.user_id,
            role = ?self.session.role,
            "Session committed"
        );
        Ok(())
    }

    /// Reset every field to its initial value
    pub fn clear_session(&mut self) -> LicensifyResult<()> {
        self.replace(Session::default(), CredentialDraft::default())?;
        info!("Session cleared");
        Ok(())
    }

    /// Persist first; a failed save leaves the current state and subscribers untouched
    fn replace(&mut self, session: Session, draft: CredentialDraft) -> LicensifyResult<()> {
        self.persistence.save(&SessionSnapshot::from(&session))?;
        self.session = session;
        self.draft = draft;
        self.notifier.send_replace(self.session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemorySessionStorage;
    use licensify_core::Role;

    fn committed(role: Role) -> CommittedSession {
        CommittedSession {
            user_id: "u1".into(),
            email: "ada@example.com".into(),
            display_name: "Ada".into(),
            token: "tok".into(),
            refresh_token: "ref".into(),
            expires_in_seconds: 3600,
            role,
        }
    }

    #[test]
    fn test_commit_sets_logged_in_and_persists() {
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = SessionStore::open(storage.clone());

        store.commit_session(committed(Role::User)).unwrap();

        assert!(store.session().is_logged_in);
        assert_eq!(store.session().role, Some(Role::User));
        assert!(store.session().is_consistent());

        let persisted = storage.load().unwrap().unwrap();
        assert!(persisted.is_logged_in);
        assert_eq!(persisted.token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_commit_rejects_empty_token() {
        let mut store = SessionStore::open(Arc::new(MemorySessionStorage::new()));
        let mut data = committed(Role::Admin);
        data.token = "  ".into();

        assert!(store.commit_session(data).is_err());
        assert!(!store.session().is_logged_in);
    }

    #[test]
    fn test_password_draft_is_never_persisted() {
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = SessionStore::open(storage.clone());

        store
            .set_credential_draft(CredentialField::Email, "ada@example.com")
            .unwrap();
        store
            .set_credential_draft(CredentialField::Password, "hunter2")
            .unwrap();

        assert_eq!(store.draft().password, "hunter2");
        let json = serde_json::to_string(&storage.load().unwrap().unwrap()).unwrap();
        assert!(json.contains("ada@example.com"));
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_clear_resets_every_field() {
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = SessionStore::open(storage.clone());
        store.commit_session(committed(Role::Admin)).unwrap();

        store.clear_session().unwrap();

        assert_eq!(store.session(), &Session::default());
        assert_eq!(store.draft(), &CredentialDraft::default());
        assert_eq!(storage.load().unwrap(), Some(SessionSnapshot::default()));
    }

    #[test]
    fn test_open_discards_inconsistent_snapshot() {
        let storage = Arc::new(MemorySessionStorage::with_snapshot(SessionSnapshot {
            is_logged_in: true,
            user_id: "u1".into(),
            role: None,
            token: Some("tok".into()),
            ..SessionSnapshot::default()
        }));

        let store = SessionStore::open(storage);
        assert!(!store.session().is_logged_in);
    }

    struct ReadOnlyStorage;

    impl SessionPersistence for ReadOnlyStorage {
        fn load(&self) -> LicensifyResult<Option<SessionSnapshot>> {
            Ok(None)
        }

        fn save(&self, _snapshot: &SessionSnapshot) -> LicensifyResult<()> {
            Err(licensify_core::LicensifyError::Storage {
                message: "read-only file system".into(),
                source: None,
                context: licensify_core::ErrorContext::new("test"),
            })
        }
    }

    #[test]
    fn test_failed_save_leaves_state_untouched() {
        let mut store = SessionStore::open(Arc::new(ReadOnlyStorage));
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        assert!(store.commit_session(committed(Role::User)).is_err());
        assert_eq!(store.session(), &Session::default());
        assert!(!rx.has_changed().unwrap());

        assert!(store
            .set_credential_draft(CredentialField::Password, "hunter2")
            .is_err());
        assert_eq!(store.draft().password, "");
    }

    #[test]
    fn test_subscribers_observe_mutations() {
        let mut store = SessionStore::open(Arc::new(MemorySessionStorage::new()));
        let mut rx = store.subscribe();
        assert!(!rx.borrow_and_update().is_logged_in);

        store.commit_session(committed(Role::User)).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_logged_in);

        store.clear_session().unwrap();
        assert!(!rx.borrow().is_logged_in);
    }
}
