//! Admin review of license requests

use super::{Collection, DialogAction, DialogState, MutationOutcome, Pagination};
use crate::session::Session;
use crate::{ApplicationError, ApplicationResult};
use licensify_client::{LicenseBackend, RequestDecision};
use licensify_core::{
    log_operation_error, log_operation_start, log_operation_success, LicenseRequest,
    RequestStatus,
};
use tracing::debug;

/// Processed means anything that is no longer pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestTab {
    #[default]
    Pending,
    Processed,
}

impl RequestTab {
    pub fn matches(&self, status: RequestStatus) -> bool {
        match self {
            RequestTab::Pending => status == RequestStatus::Pending,
            RequestTab::Processed => status != RequestStatus::Pending,
        }
    }
}

impl std::fmt::Display for RequestTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestTab::Pending => write!(f, "pending"),
            RequestTab::Processed => write!(f, "processed"),
        }
    }
}

impl std::str::FromStr for RequestTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(RequestTab::Pending),
            "processed" => Ok(RequestTab::Processed),
            _ => Err(format!("Unknown tab: {}", s)),
        }
    }
}

pub struct AdminRequestsView {
    requests: Collection<LicenseRequest>,
    tab: RequestTab,
    pagination: Pagination,
    dialog: DialogState<LicenseRequest>,
}

impl AdminRequestsView {
    pub fn new(page_size: usize) -> Self {
        Self {
            requests: Collection::default(),
            tab: RequestTab::Pending,
            pagination: Pagination::new(page_size),
            dialog: DialogState::default(),
        }
    }

    pub fn requests(&self) -> &Collection<LicenseRequest> {
        &self.requests
    }

    pub async fn load(&mut self, backend: &dyn LicenseBackend) -> bool {
        let loaded = self
            .requests
            .refresh("get_all_pending_requests", backend.get_all_pending_requests())
            .await;
        let len = self.filtered().len();
        self.pagination.clamp(len);
        loaded
    }

    pub fn tab(&self) -> RequestTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: RequestTab) {
        self.tab = tab;
        self.pagination.reset();
    }

    pub fn filtered(&self) -> Vec<&LicenseRequest> {
        self.requests
            .items()
            .iter()
            .filter(|request| self.tab.matches(request.status))
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

    pub fn dialog(&self) -> &DialogState<LicenseRequest> {
        &self.dialog
    }

    /// Open the accept or reject dialog for a pending request
    pub fn open_decision(
        &mut self,
        request_id: &str,
        action: DialogAction,
    ) -> ApplicationResult<()> {
        if !action.requires_comment() {
            return Err(ApplicationError::invalid_input(format!(
                "'{}' is not an admin decision",
                action
            )));
        }

        let request = self
            .requests
            .items()
            .iter()
            .find(|r| r.id == request_id.trim())
            .cloned()
            .ok_or_else(|| ApplicationError::not_found(format!("Request '{}'", request_id)))?;

        if request.status != RequestStatus::Pending {
            return Err(ApplicationError::invalid_input(format!(
                "Request '{}' was already {}",
                request.id, request.status
            )));
        }

        debug!(request_id = %request.id, %action, "Opening decision dialog");
        self.dialog.open(request, action);
        Ok(())
    }

    pub fn set_comment(&mut self, text: impl Into<String>) {
        self.dialog.set_comment(text);
    }

    pub fn cancel(&mut self) {
        self.dialog.close();
    }

    /// Send the decision. A blank comment sends nothing and leaves the dialog
    /// open.
    pub async fn confirm(
        &mut self,
        backend: &dyn LicenseBackend,
        session: &Session,
    ) -> MutationOutcome {
        if self.dialog.comment().trim().is_empty() {
            debug!("Decision comment is blank, ignoring confirm");
            return MutationOutcome::Skipped;
        }
        let Some(submission) = self.dialog.begin_submit() else {
            return MutationOutcome::Skipped;
        };
        let Some(status) = submission.action.decision_status() else {
            self.dialog.close();
            return MutationOutcome::Skipped;
        };

        let decision = RequestDecision {
            request_id: submission.item.id.clone(),
            user_id: submission.item.user_id.clone(),
            license_id: submission.item.license_id.clone(),
            status,
            comment: submission.comment,
            admin_id: session.user_id.clone(),
        };

        log_operation_start!("update_request", request_id = %decision.request_id, %status);
        let result = backend.update_request(&decision).await;
        self.dialog.close();

        match result {
            Ok(()) => {
                log_operation_success!("update_request", request_id = %decision.request_id);
                self.load(backend).await;
                MutationOutcome::Completed
            }
            Err(e) => {
                log_operation_error!("update_request", e, request_id = %decision.request_id);
                MutationOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_matching() {
        assert!(RequestTab::Pending.matches(RequestStatus::Pending));
        assert!(!RequestTab::Pending.matches(RequestStatus::Rejected));
        assert!(RequestTab::Processed.matches(RequestStatus::Accepted));
        assert!(RequestTab::Processed.matches(RequestStatus::Rejected));
        assert_eq!("Processed".parse::<RequestTab>(), Ok(RequestTab::Processed));
    }

    #[test]
    fn test_request_action_is_not_a_decision() {
        let mut view = AdminRequestsView::new(5);
        let err = view.open_decision("r1", DialogAction::Request).unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidInput { .. }));
    }
}
