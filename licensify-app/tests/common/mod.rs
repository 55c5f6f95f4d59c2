//! Shared fixtures for the dashboard tests
//!
//! In-memory stand-ins for the license backend and the identity provider,
//! plus builders for the records they serve.

#![allow(dead_code)]

use async_trait::async_trait;
use licensify_app::{
    Dashboard, MemorySessionStorage, SessionPersistence, SessionSnapshot, SessionStore,
};
use licensify_client::{
    BackendLogin, IdentityProvider, LicenseBackend, RequestDecision, VerifiedIdentity,
};
use licensify_core::{
    ErrorContext, License, LicenseRequest, LicensifyConfig, LicensifyError, LicensifyResult,
    OwnedLicense, RequestStatus,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

/// Initialize logging for tests
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("licensify=debug,info")
            .with_test_writer()
            .try_init();
    });
}

pub fn license(id: &str, name: &str) -> License {
    License {
        id: id.to_string(),
        name: Some(name.to_string()),
        price: 12.5,
        available_count: 3,
        image_url: None,
    }
}

pub fn owned(name: &str, expiry: &str) -> OwnedLicense {
    OwnedLicense {
        id: format!("owned-{}", name.to_lowercase()),
        name: name.to_string(),
        expiry: expiry.to_string(),
        price: 9.0,
        image_url: None,
    }
}

pub fn request(id: &str, name: &str, status: RequestStatus) -> LicenseRequest {
    LicenseRequest {
        id: id.to_string(),
        license_name: name.to_string(),
        image_url: None,
        status,
        comments: Vec::new(),
        user_id: Some("user-1".into()),
        license_id: Some(format!("lic-{}", id)),
    }
}

fn unavailable(operation: &str) -> LicensifyError {
    LicensifyError::Backend {
        status: 503,
        message: "backend unavailable".to_string(),
        context: ErrorContext::new("fake_backend").with_operation(operation),
    }
}

/// Backend that serves canned collections and records every mutation
#[derive(Default)]
pub struct FakeBackend {
    pub licenses: Mutex<Vec<License>>,
    pub owned: Mutex<Vec<OwnedLicense>>,
    pub requests: Mutex<Vec<LicenseRequest>>,
    pub created: Mutex<Vec<(String, String, String)>>,
    pub decisions: Mutex<Vec<RequestDecision>>,
    pub fetches: Mutex<Vec<&'static str>>,
    pub access_token: Mutex<Option<String>>,
    pub login_response: Mutex<Option<BackendLogin>>,
    pub fail_reads: Mutex<bool>,
    pub fail_mutations: Mutex<bool>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_licenses(self, licenses: Vec<License>) -> Self {
        *self.licenses.lock().unwrap() = licenses;
        self
    }

    pub fn with_owned(self, owned: Vec<OwnedLicense>) -> Self {
        *self.owned.lock().unwrap() = owned;
        self
    }

    pub fn with_requests(self, requests: Vec<LicenseRequest>) -> Self {
        *self.requests.lock().unwrap() = requests;
        self
    }

    pub fn with_login(self, user_id: Option<&str>, role: Option<&str>) -> Self {
        *self.login_response.lock().unwrap() = Some(BackendLogin {
            user_id: user_id.map(str::to_string),
            role: role.map(str::to_string),
        });
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        *self.fail_mutations.lock().unwrap() = fail;
    }

    pub fn fetch_count(&self, operation: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|op| **op == operation)
            .count()
    }

    fn read<T: Clone>(
        &self,
        operation: &'static str,
        source: &Mutex<Vec<T>>,
    ) -> LicensifyResult<Vec<T>> {
        self.fetches.lock().unwrap().push(operation);
        if *self.fail_reads.lock().unwrap() {
            return Err(unavailable(operation));
        }
        Ok(source.lock().unwrap().clone())
    }
}

#[async_trait]
impl LicenseBackend for FakeBackend {
    async fn get_unassigned_licenses(&self) -> LicensifyResult<Vec<License>> {
        self.read("get_unassigned_licenses", &self.licenses)
    }

    async fn create_request(
        &self,
        user_id: &str,
        license_name: &str,
        comment: &str,
    ) -> LicensifyResult<()> {
        if *self.fail_mutations.lock().unwrap() {
            return Err(unavailable("create_request"));
        }
        self.created.lock().unwrap().push((
            user_id.to_string(),
            license_name.to_string(),
            comment.to_string(),
        ));
        Ok(())
    }

    async fn get_my_licenses(&self, _user_id: &str) -> LicensifyResult<Vec<OwnedLicense>> {
        self.read("get_my_licenses", &self.owned)
    }

    async fn get_all_pending_requests(&self) -> LicensifyResult<Vec<LicenseRequest>> {
        self.read("get_all_pending_requests", &self.requests)
    }

    async fn update_request(&self, decision: &RequestDecision) -> LicensifyResult<()> {
        if *self.fail_mutations.lock().unwrap() {
            return Err(unavailable("update_request"));
        }
        let mut requests = self.requests.lock().unwrap();
        if let Some(request) = requests.iter_mut().find(|r| r.id == decision.request_id) {
            request.status = decision.status;
        }
        self.decisions.lock().unwrap().push(decision.clone());
        Ok(())
    }

    async fn my_requests(&self, _user_id: &str) -> LicensifyResult<Vec<LicenseRequest>> {
        self.read("my_requests", &self.requests)
    }

    async fn login(&self, token: &str) -> LicensifyResult<BackendLogin> {
        if token.is_empty() {
            return Err(unavailable("login"));
        }
        self.login_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| LicensifyError::Authentication {
                message: "unknown user".to_string(),
                context: ErrorContext::new("fake_backend"),
            })
    }

    fn set_access_token(&self, token: Option<String>) {
        *self.access_token.lock().unwrap() = token;
    }
}

/// Identity provider that accepts exactly one password
pub struct FakeIdentity {
    pub password: String,
    pub calls: Mutex<usize>,
}

impl FakeIdentity {
    pub fn accepting(password: &str) -> Self {
        Self {
            password: password.to_string(),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> LicensifyResult<VerifiedIdentity> {
        *self.calls.lock().unwrap() += 1;
        if password != self.password {
            return Err(LicensifyError::Identity {
                message: "INVALID_PASSWORD".to_string(),
                context: ErrorContext::new("fake_identity"),
            });
        }
        Ok(VerifiedIdentity {
            id_token: "id-token".to_string(),
            refresh_token: "refresh-token".to_string(),
            email: email.to_string(),
            display_name: "Ada Lovelace".to_string(),
            expires_in_seconds: 3600,
            local_id: "fb-1".to_string(),
        })
    }
}

pub type TestDashboard = Dashboard<FakeBackend, FakeIdentity>;

/// In-memory persistence whose saves can be made to fail, like a full disk
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemorySessionStorage,
    fail_saves: AtomicBool,
}

impl FlakyStorage {
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl SessionPersistence for FlakyStorage {
    fn load(&self) -> LicensifyResult<Option<SessionSnapshot>> {
        self.inner.load()
    }

    fn save(&self, snapshot: &SessionSnapshot) -> LicensifyResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(LicensifyError::Storage {
                message: "disk full".to_string(),
                source: None,
                context: ErrorContext::new("flaky_storage"),
            });
        }
        self.inner.save(snapshot)
    }
}

/// Dashboard over in-memory storage, logged out
pub fn dashboard(
    backend: FakeBackend,
) -> (TestDashboard, Arc<FakeBackend>, Arc<MemorySessionStorage>) {
    dashboard_with_storage(backend, Arc::new(MemorySessionStorage::new()))
}

pub fn dashboard_with_storage(
    backend: FakeBackend,
    storage: Arc<MemorySessionStorage>,
) -> (TestDashboard, Arc<FakeBackend>, Arc<MemorySessionStorage>) {
    let (dashboard, backend) = dashboard_with_persistence(backend, storage.clone());
    (dashboard, backend, storage)
}

pub fn dashboard_with_persistence(
    backend: FakeBackend,
    persistence: Arc<dyn SessionPersistence>,
) -> (TestDashboard, Arc<FakeBackend>) {
    init_logging();
    let backend = Arc::new(backend);
    let store = SessionStore::open(persistence);
    let dashboard = Dashboard::new(
        LicensifyConfig::default(),
        store,
        backend.clone(),
        Arc::new(FakeIdentity::accepting("hunter2")),
    );
    (dashboard, backend)
}

/// Log in through the real flow with the given backend role
pub async fn logged_in(backend: FakeBackend, role: &str) -> (TestDashboard, Arc<FakeBackend>) {
    let (mut dashboard, backend, _) = dashboard(backend.with_login(Some("user-1"), Some(role)));
    dashboard
        .set_credential(licensify_app::CredentialField::Email, "ada@example.com")
        .unwrap();
    dashboard
        .set_credential(licensify_app::CredentialField::Password, "hunter2")
        .unwrap();
    dashboard.login().await.unwrap();
    (dashboard, backend)
}
