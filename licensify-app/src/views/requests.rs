//! The user's own license requests

use super::{matches_term, normalize_term, Collection, Pagination};
use crate::session::Session;
use licensify_client::LicenseBackend;
use licensify_core::{LicenseRequest, RequestStatus};
use tracing::debug;

/// Status filter of the requests page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Accepted,
    Rejected,
}

impl StatusFilter {
    pub fn matches(&self, status: RequestStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == RequestStatus::Pending,
            StatusFilter::Accepted => status == RequestStatus::Accepted,
            StatusFilter::Rejected => status == RequestStatus::Rejected,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Pending => write!(f, "pending"),
            StatusFilter::Accepted => write!(f, "accepted"),
            StatusFilter::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(StatusFilter::All),
            other => other
                .parse::<RequestStatus>()
                .map(|status| match status {
                    RequestStatus::Pending => StatusFilter::Pending,
                    RequestStatus::Accepted => StatusFilter::Accepted,
                    RequestStatus::Rejected => StatusFilter::Rejected,
                })
                .map_err(|_| format!("Unknown status filter: {}", s)),
        }
    }
}

pub struct RequestsView {
    requests: Collection<LicenseRequest>,
    search: String,
    status_filter: StatusFilter,
    pagination: Pagination,
}

impl RequestsView {
    pub fn new(page_size: usize) -> Self {
        Self {
            requests: Collection::default(),
            search: String::new(),
            status_filter: StatusFilter::All,
            pagination: Pagination::new(page_size),
        }
    }

    pub fn requests(&self) -> &Collection<LicenseRequest> {
        &self.requests
    }

    pub async fn load(&mut self, backend: &dyn LicenseBackend, session: &Session) -> bool {
        if session.user_id.is_empty() {
            debug!("No user id in session, skipping request fetch");
            self.requests.skip();
            return false;
        }
        let loaded = self
            .requests
            .refresh("my_requests", backend.my_requests(&session.user_id))
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

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
        self.pagination.reset();
    }

    /// Requests matching both the license name search and the status filter
    pub fn filtered(&self) -> Vec<&LicenseRequest> {
        let term = normalize_term(&self.search);
        self.requests
            .items()
            .iter()
            .filter(|request| {
                matches_term(&request.license_name, &term)
                    && self.status_filter.matches(request.status)
            })
            .collect()
    }

    pub fn visible(&self) -> Vec<&LicenseRequest> {
        let filtered = self.filtered();
        self.pagination.slice(&filtered).to_vec()
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

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str, name: &str, status: RequestStatus) -> LicenseRequest {
        LicenseRequest {
            id: id.to_string(),
            license_name: name.to_string(),
            image_url: None,
            status,
            comments: Vec::new(),
            user_id: Some("u1".into()),
            license_id: None,
        }
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!("ALL".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(" rejected".parse::<StatusFilter>(), Ok(StatusFilter::Rejected));
        assert!("closed".parse::<StatusFilter>().is_err());
    }

    #[tokio::test]
    async fn test_search_and_filter_reset_page() {
        let mut view = RequestsView::new(5);
        let items: Vec<_> = (0..12)
            .map(|i| {
                let status = if i % 3 == 0 {
                    RequestStatus::Accepted
                } else {
                    RequestStatus::Pending
                };
                request(&format!("r{i}"), &format!("Tool {i}"), status)
            })
            .collect();
        view.requests.refresh("test", async { Ok(items) }).await;

        view.next_page();
        assert_eq!(view.page(), 2);
        view.set_status_filter(StatusFilter::Accepted);
        assert_eq!(view.page(), 1);
        assert_eq!(view.filtered().len(), 4);

        view.set_status_filter(StatusFilter::All);
        view.next_page();
        view.set_search("tool 1");
        assert_eq!(view.page(), 1);
        // "Tool 1", "Tool 10", "Tool 11"
        assert_eq!(view.visible().len(), 3);
    }
}
