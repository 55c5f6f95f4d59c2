//! Login flow
//!
//! Email and password go to the identity provider, the resulting token is
//! exchanged at the backend for a role and the canonical user id, and only
//! then is the session committed. A failure at either step commits nothing.

use crate::session::{CommittedSession, SessionStore};
use crate::{ApplicationError, ApplicationResult};
use licensify_client::{BackendLogin, IdentityProvider, LicenseBackend};
use licensify_core::{
    log_operation_error, log_operation_start, log_operation_success, performance, Role,
};

/// Step of the login flow that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    Identity,
    Backend,
}

impl std::fmt::Display for LoginStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginStage::Identity => write!(f, "identity"),
            LoginStage::Backend => write!(f, "backend"),
        }
    }
}

pub struct LoginFlow<'a> {
    identity: &'a dyn IdentityProvider,
    backend: &'a dyn LicenseBackend,
}

impl<'a> LoginFlow<'a> {
    pub fn new(identity: &'a dyn IdentityProvider, backend: &'a dyn LicenseBackend) -> Self {
        Self { identity, backend }
    }

    /// Log in with the credentials drafted in `store`
    pub async fn login(&self, store: &mut SessionStore) -> ApplicationResult<()> {
        let draft = store.draft().clone();
        let email = draft.email.trim();
        if email.is_empty() || draft.password.is_empty() {
            return Err(ApplicationError::login(
                LoginStage::Identity,
                "Email and password are required",
            ));
        }

        log_operation_start!("login", email = %email);

        let verified = performance::measure_async(
            "identity_sign_in",
            self.identity.sign_in(email, &draft.password),
        )
        .await
        .map_err(|e| {
            log_operation_error!("login", e, stage = "identity");
            ApplicationError::login(LoginStage::Identity, e.to_string())
        })?;

        let exchanged = performance::measure_async(
            "backend_login",
            self.backend.login(&verified.id_token),
        )
        .await
        .map_err(|e| {
            log_operation_error!("login", e, stage = "backend");
            ApplicationError::login(LoginStage::Backend, e.to_string())
        })?;

        let (user_id, role) = resolve_account(exchanged)?;

        store.commit_session(CommittedSession {
            user_id,
            email: verified.email,
            display_name: verified.display_name,
            token: verified.id_token,
            refresh_token: verified.refresh_token,
            expires_in_seconds: verified.expires_in_seconds,
            role,
        })?;

        log_operation_success!("login", role = %role);
        Ok(())
    }
}

/// Canonical user id and role from the backend login response. A missing or
/// empty role means a regular user.
fn resolve_account(login: BackendLogin) -> ApplicationResult<(String, Role)> {
    let user_id = login
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            ApplicationError::login(LoginStage::Backend, "Login response is missing the user id")
        })?;

    let role = match login.role.as_deref().map(str::trim) {
        None | Some("") => Role::User,
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e| ApplicationError::login(LoginStage::Backend, e))?,
    };

    Ok((user_id, role))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_login(id: Option<&str>, role: Option<&str>) -> BackendLogin {
        BackendLogin {
            user_id: id.map(str::to_string),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn test_role_is_case_insensitive_and_defaults_to_user() {
        assert_eq!(
            resolve_account(backend_login(Some("u1"), Some("ADMIN"))).unwrap(),
            ("u1".to_string(), Role::Admin)
        );
        assert_eq!(
            resolve_account(backend_login(Some("u1"), None)).unwrap().1,
            Role::User
        );
        assert_eq!(
            resolve_account(backend_login(Some("u1"), Some(""))).unwrap().1,
            Role::User
        );
    }

    #[test]
    fn test_missing_user_id_fails_at_backend_stage() {
        let err = resolve_account(backend_login(None, Some("user"))).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Login {
                stage: LoginStage::Backend,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!(resolve_account(backend_login(Some("u1"), Some("owner"))).is_err());
    }
}
