//! Layout Shell
//!
//! [`Dashboard`] owns the session store and the service clients, asks the
//! route table which page may be mounted, and mounts a fresh page on every
//! navigation. Page-local state (search, page number, open dialog) is dropped
//! with the page.

use crate::login::LoginFlow;
use crate::routing::{AppRoute, NavItem, RouteTable};
use crate::session::{
    CredentialField, FileSessionStorage, Session, SessionPersistence, SessionStore,
};
use crate::views::{
    AdminRequestsView, DialogAction, LicensesView, MutationOutcome, MyLicensesView, RequestsView,
};
use crate::{ApplicationError, ApplicationResult};
use licensify_client::{
    ApiClientConfig, BackendClient, FirebaseIdentityClient, IdentityProvider, LicenseBackend,
};
use licensify_core::{LicensifyConfig, LicensifyResult};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// The mounted page and its local state
pub enum Page {
    Login,
    Licenses(LicensesView),
    MyLicenses(MyLicensesView),
    Requests(RequestsView),
    AdminRequests(AdminRequestsView),
}

impl Page {
    pub fn route(&self) -> AppRoute {
        match self {
            Page::Login => AppRoute::Login,
            Page::Licenses(_) => AppRoute::Licenses,
            Page::MyLicenses(_) => AppRoute::MyLicenses,
            Page::Requests(_) => AppRoute::Requests,
            Page::AdminRequests(_) => AppRoute::AdminRequests,
        }
    }

    /// Error of the page's most recent fetch
    pub fn last_error(&self) -> Option<&str> {
        match self {
            Page::Login => None,
            Page::Licenses(view) => view.catalog().last_error(),
            Page::MyLicenses(view) => view.licenses().last_error(),
            Page::Requests(view) => view.requests().last_error(),
            Page::AdminRequests(view) => view.requests().last_error(),
        }
    }

    /// The page's first fetch has not settled yet
    pub fn is_loading(&self) -> bool {
        match self {
            Page::Login => false,
            Page::Licenses(view) => view.catalog().is_loading(),
            Page::MyLicenses(view) => view.licenses().is_loading(),
            Page::Requests(view) => view.requests().is_loading(),
            Page::AdminRequests(view) => view.requests().is_loading(),
        }
    }

    /// The backend rejected the session token on the last fetch
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Page::Login => false,
            Page::Licenses(view) => view.catalog().is_unauthorized(),
            Page::MyLicenses(view) => view.licenses().is_unauthorized(),
            Page::Requests(view) => view.requests().is_unauthorized(),
            Page::AdminRequests(view) => view.requests().is_unauthorized(),
        }
    }

    /// Apply a search term; `false` when the page has no search box
    pub fn set_search(&mut self, term: &str) -> bool {
        match self {
            Page::Licenses(view) => view.set_search(term),
            Page::MyLicenses(view) => view.set_search(term),
            Page::Requests(view) => view.set_search(term),
            Page::Login | Page::AdminRequests(_) => return false,
        }
        true
    }

    pub fn next_page(&mut self) -> bool {
        match self {
            Page::Licenses(view) => view.next_page(),
            Page::MyLicenses(view) => view.next_page(),
            Page::Requests(view) => view.next_page(),
            Page::AdminRequests(view) => view.next_page(),
            Page::Login => return false,
        }
        true
    }

    pub fn prev_page(&mut self) -> bool {
        match self {
            Page::Licenses(view) => view.prev_page(),
            Page::MyLicenses(view) => view.prev_page(),
            Page::Requests(view) => view.prev_page(),
            Page::AdminRequests(view) => view.prev_page(),
            Page::Login => return false,
        }
        true
    }

    /// Jump to a 1-based page, clamped to the last one
    pub fn go_to_page(&mut self, page: usize) -> bool {
        let Some(current) = self.current_page() else {
            return false;
        };
        for _ in 1..current {
            self.prev_page();
        }
        for _ in 1..page {
            self.next_page();
        }
        true
    }

    /// Current page number and page count
    pub fn current_page(&self) -> Option<usize> {
        self.pagination().map(|(page, _)| page)
    }

    pub fn pagination(&self) -> Option<(usize, usize)> {
        match self {
            Page::Login => None,
            Page::Licenses(view) => Some((view.page(), view.total_pages())),
            Page::MyLicenses(view) => Some((view.page(), view.total_pages())),
            Page::Requests(view) => Some((view.page(), view.total_pages())),
            Page::AdminRequests(view) => Some((view.page(), view.total_pages())),
        }
    }
}

/// Result of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub route: AppRoute,
    pub redirected: bool,
}

pub struct Dashboard<B, I> {
    config: LicensifyConfig,
    store: SessionStore,
    backend: Arc<B>,
    identity: Arc<I>,
    page: Page,
}

impl Dashboard<BackendClient, FirebaseIdentityClient> {
    /// Wire the HTTP clients and the on-disk session snapshot from configuration
    pub fn from_config(config: LicensifyConfig) -> LicensifyResult<Self> {
        let backend = BackendClient::new(ApiClientConfig::backend(&config.api))?;
        let identity =
            FirebaseIdentityClient::from_config(&config.identity, &config.api.user_agent)?;
        let persistence: Arc<dyn SessionPersistence> =
            Arc::new(FileSessionStorage::new(config.session_file_path())?);
        let store = SessionStore::open(persistence);

        Ok(Self::new(config, store, Arc::new(backend), Arc::new(identity)))
    }
}

impl<B, I> Dashboard<B, I>
where
    B: LicenseBackend,
    I: IdentityProvider,
{
    pub fn new(
        config: LicensifyConfig,
        store: SessionStore,
        backend: Arc<B>,
        identity: Arc<I>,
    ) -> Self {
        let dashboard = Self {
            config,
            store,
            backend,
            identity,
            page: Page::Login,
        };
        dashboard.sync_access_token();
        dashboard
    }

    pub fn config(&self) -> &LicensifyConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        self.store.session()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.store.subscribe()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Sidebar for the current session
    pub fn navigation(&self) -> Vec<NavItem> {
        RouteTable::navigation(self.store.session().active_role())
    }

    /// Resolve `path`, mount the resulting page and run its initial fetch
    pub async fn navigate(&mut self, path: &str) -> Navigation {
        let decision = RouteTable::resolve(path, self.store.session());
        let route = decision.route();
        if decision.is_redirect() {
            info!(requested = %path, redirect = %route, "Redirecting navigation");
        }

        self.page = self.mount(route);
        self.refresh().await;

        Navigation {
            requested: path.to_string(),
            route,
            redirected: decision.is_redirect(),
        }
    }

    /// Re-run the mounted page's fetch
    pub async fn refresh(&mut self) -> bool {
        let backend: &dyn LicenseBackend = self.backend.as_ref();
        let session = self.store.session();
        match &mut self.page {
            Page::Login => true,
            Page::Licenses(view) => view.load(backend).await,
            Page::MyLicenses(view) => view.load(backend, session).await,
            Page::Requests(view) => view.load(backend, session).await,
            Page::AdminRequests(view) => view.load(backend).await,
        }
    }

    /// Open the request dialog on the licenses page and draft its comment
    pub fn open_request(&mut self, license: &str, comment: &str) -> ApplicationResult<()> {
        let session = self.store.session();
        let Page::Licenses(view) = &mut self.page else {
            return Err(wrong_page(AppRoute::Licenses));
        };
        view.open_request(license, session)?;
        view.set_comment(comment);
        Ok(())
    }

    pub async fn submit_request(&mut self) -> ApplicationResult<MutationOutcome> {
        let backend: &dyn LicenseBackend = self.backend.as_ref();
        let session = self.store.session();
        let Page::Licenses(view) = &mut self.page else {
            return Err(wrong_page(AppRoute::Licenses));
        };
        Ok(view.submit_request(backend, session).await)
    }

    /// Open the accept or reject dialog on the admin requests page
    pub fn open_decision(
        &mut self,
        request_id: &str,
        action: DialogAction,
        comment: &str,
    ) -> ApplicationResult<()> {
        let Page::AdminRequests(view) = &mut self.page else {
            return Err(wrong_page(AppRoute::AdminRequests));
        };
        view.open_decision(request_id, action)?;
        view.set_comment(comment);
        Ok(())
    }

    pub async fn confirm_decision(&mut self) -> ApplicationResult<MutationOutcome> {
        let backend: &dyn LicenseBackend = self.backend.as_ref();
        let session = self.store.session();
        let Page::AdminRequests(view) = &mut self.page else {
            return Err(wrong_page(AppRoute::AdminRequests));
        };
        Ok(view.confirm(backend, session).await)
    }

    pub fn set_credential(
        &mut self,
        field: CredentialField,
        value: &str,
    ) -> ApplicationResult<()> {
        self.store.set_credential_draft(field, value)?;
        Ok(())
    }

    /// Run the login flow with the drafted credentials and land on the home page
    pub async fn login(&mut self) -> ApplicationResult<Navigation> {
        let result = LoginFlow::new(self.identity.as_ref(), self.backend.as_ref())
            .login(&mut self.store)
            .await;
        self.sync_access_token();
        result?;

        Ok(self.navigate(RouteTable::HOME.path()).await)
    }

    /// Clear the session and return to the login page
    pub async fn logout(&mut self) -> ApplicationResult<Navigation> {
        let cleared = self.store.clear_session();
        self.sync_access_token();
        cleared?;

        Ok(self.navigate(AppRoute::Login.path()).await)
    }

    fn mount(&self, route: AppRoute) -> Page {
        debug!(%route, "Mounting page");
        let views = &self.config.views;
        match route {
            AppRoute::Login => Page::Login,
            AppRoute::Licenses => Page::Licenses(LicensesView::new(views.licenses_page_size)),
            AppRoute::MyLicenses => Page::MyLicenses(MyLicensesView::new(
                views.my_licenses_page_size,
                views.expiring_soon_days,
            )),
            AppRoute::Requests => Page::Requests(RequestsView::new(views.requests_page_size)),
            AppRoute::AdminRequests => {
                Page::AdminRequests(AdminRequestsView::new(views.admin_requests_page_size))
            }
        }
    }

    fn sync_access_token(&self) {
        let session = self.store.session();
        let token = session.token.clone().filter(|_| session.is_logged_in);
        self.backend.set_access_token(token);
    }
}

fn wrong_page(expected: AppRoute) -> ApplicationError {
    ApplicationError::invalid_input(format!("Navigate to {} first", expected))
}
