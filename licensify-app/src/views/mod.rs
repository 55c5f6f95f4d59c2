//! Page Views
//!
//! Every view follows the same pattern: one read on mount, the raw result kept
//! in memory, and search, filters and pagination computed from it on every
//! render. A mutation is a single backend call followed by a full re-fetch.

pub mod admin_requests;
pub mod dialog;
pub mod licenses;
pub mod my_licenses;
pub mod pagination;
pub mod requests;

pub use admin_requests::{AdminRequestsView, RequestTab};
pub use dialog::{DialogAction, DialogState, MutationOutcome, Submission};
pub use licenses::LicensesView;
pub use my_licenses::{MyLicensesView, OwnedLicenseRow};
pub use pagination::Pagination;
pub use requests::{RequestsView, StatusFilter};

use licensify_core::{log_operation_error, performance, LicensifyResult};
use std::future::Future;

/// Server collection held by a view. It counts as loading from creation until
/// the first fetch settles.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    loading: bool,
    last_error: Option<String>,
    unauthorized: bool,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            last_error: None,
            unauthorized: false,
        }
    }
}

impl<T> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Settle without fetching, for views that have nothing to ask for
    pub(crate) fn skip(&mut self) {
        self.loading = false;
    }

    /// Message of the most recent failed fetch
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the most recent fetch was rejected for a stale or missing token
    pub fn is_unauthorized(&self) -> bool {
        self.unauthorized
    }

    /// Replace the items with a fresh fetch. On failure the previous items are
    /// kept and the error is only logged.
    pub(crate) async fn refresh<F>(&mut self, operation: &str, fetch: F) -> bool
    where
        F: Future<Output = LicensifyResult<Vec<T>>>,
    {
        self.loading = true;
        let result = performance::measure_async(operation, fetch).await;
        self.loading = false;

        match result {
            Ok(items) => {
                self.items = items;
                self.last_error = None;
                self.unauthorized = false;
                true
            }
            Err(e) => {
                log_operation_error!(operation, e);
                self.last_error = Some(e.to_string());
                self.unauthorized = e.is_unauthorized();
                false
            }
        }
    }
}

/// Lowercased, trimmed search term
pub(crate) fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Case-insensitive substring match against an already normalized term
pub(crate) fn matches_term(haystack: &str, term: &str) -> bool {
    term.is_empty() || haystack.to_lowercase().contains(term)
}
