//! License catalog page

use super::{
    matches_term, normalize_term, Collection, DialogAction, DialogState, MutationOutcome,
    Pagination,
};
use crate::session::Session;
use crate::{ApplicationError, ApplicationResult};
use licensify_client::LicenseBackend;
use licensify_core::{
    log_operation_error, log_operation_start, log_operation_success, License, Role,
};
use tracing::debug;

pub struct LicensesView {
    catalog: Collection<License>,
    search: String,
    pagination: Pagination,
    dialog: DialogState<License>,
}

impl LicensesView {
    pub fn new(page_size: usize) -> Self {
        Self {
            catalog: Collection::default(),
            search: String::new(),
            pagination: Pagination::new(page_size),
            dialog: DialogState::default(),
        }
    }

    pub fn catalog(&self) -> &Collection<License> {
        &self.catalog
    }

    pub async fn load(&mut self, backend: &dyn LicenseBackend) -> bool {
        let loaded = self
            .catalog
            .refresh("get_unassigned_licenses", backend.get_unassigned_licenses())
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

    /// Licenses whose id or name contains the search term
    pub fn filtered(&self) -> Vec<&License> {
        let term = normalize_term(&self.search);
        self.catalog
            .items()
            .iter()
            .filter(|license| {
                matches_term(&license.id, &term)
                    || license
                        .name
                        .as_deref()
                        .is_some_and(|name| matches_term(name, &term))
            })
            .collect()
    }

    pub fn visible(&self) -> Vec<&License> {
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

    pub fn dialog(&self) -> &DialogState<License> {
        &self.dialog
    }

    /// Open the request dialog for a license, looked up by id or name
    pub fn open_request(&mut self, license: &str, session: &Session) -> ApplicationResult<()> {
        if session.active_role() != Some(Role::User) {
            return Err(ApplicationError::permission(
                "Only users can request licenses",
            ));
        }

        let key = license.trim();
        let selected = self
            .catalog
            .items()
            .iter()
            .find(|l| l.id == key || l.display_name().eq_ignore_ascii_case(key))
            .cloned()
            .ok_or_else(|| ApplicationError::not_found(format!("License '{}'", key)))?;

        debug!(license_id = %selected.id, "Opening license request dialog");
        self.dialog.open(selected, DialogAction::Request);
        Ok(())
    }

    pub fn set_comment(&mut self, text: impl Into<String>) {
        self.dialog.set_comment(text);
    }

    pub fn cancel(&mut self) {
        self.dialog.close();
    }

    /// Send the request. The comment may be blank.
    pub async fn submit_request(
        &mut self,
        backend: &dyn LicenseBackend,
        session: &Session,
    ) -> MutationOutcome {
        let Some(submission) = self.dialog.begin_submit() else {
            return MutationOutcome::Skipped;
        };
        // The backend keys requests by the catalog id, which is the license name
        let license_name = submission.item.id.as_str();

        log_operation_start!("create_request", license = %license_name);
        let result = backend
            .create_request(&session.user_id, license_name, &submission.comment)
            .await;
        self.dialog.close();

        match result {
            Ok(()) => {
                log_operation_success!("create_request", license = %license_name);
                self.load(backend).await;
                MutationOutcome::Completed
            }
            Err(e) => {
                log_operation_error!("create_request", e, license = %license_name);
                MutationOutcome::Failed(e.to_string())
            }
        }
    }
}
