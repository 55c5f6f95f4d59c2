//! Licenses assigned to the logged-in user

use super::{matches_term, normalize_term, Collection, Pagination};
use crate::session::Session;
use chrono::NaiveDate;
use licensify_client::LicenseBackend;
use licensify_core::{ExpiryStatus, OwnedLicense};
use tracing::debug;

/// An owned license with its expiry classified against a reference date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnedLicenseRow<'a> {
    pub license: &'a OwnedLicense,
    pub status: ExpiryStatus,
}

pub struct MyLicensesView {
    licenses: Collection<OwnedLicense>,
    search: String,
    pagination: Pagination,
    expiring_soon_days: i64,
}

impl MyLicensesView {
    pub fn new(page_size: usize, expiring_soon_days: i64) -> Self {
        Self {
            licenses: Collection::default(),
            search: String::new(),
            pagination: Pagination::new(page_size),
            expiring_soon_days,
        }
    }

    pub fn licenses(&self) -> &Collection<OwnedLicense> {
        &self.licenses
    }

    /// Fetch the user's licenses; skipped when the session carries no user id
    pub async fn load(&mut self, backend: &dyn LicenseBackend, session: &Session) -> bool {
        if session.user_id.is_empty() {
            debug!("No user id in session, skipping owned license fetch");
            self.licenses.skip();
            return false;
        }
        let loaded = self
            .licenses
            .refresh("get_my_licenses", backend.get_my_licenses(&session.user_id))
            .await;
        let len = self.filtered().len();
        self.pagination.clamp(len);
        loaded
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.pagination.reset();
    }

    pub fn filtered(&self) -> Vec<&OwnedLicense> {
        let term = normalize_term(&self.search);
        self.licenses
            .items()
            .iter()
            .filter(|license| matches_term(&license.name, &term))
            .collect()
    }

    /// Rows on the current page, classified against `today`
    pub fn visible(&self, today: NaiveDate) -> Vec<OwnedLicenseRow<'_>> {
        let filtered = self.filtered();
        self.pagination
            .slice(&filtered)
            .iter()
            .map(|&license| OwnedLicenseRow {
                license,
                status: license.expiry_status(today, self.expiring_soon_days),
            })
            .collect()
    }

    pub fn page(&self) -> usize {
        self.pagination.page()
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.filtered().len())
    }

    pub fn next_page(&mut self) {
        let len = self.filtered().len();
        self.pagination.next(len);
    }

    pub fn prev_page(&mut self) {
        self.pagination.prev();
    }
}
