//! Confirmation dialog state machine
//!
//! One dialog per view, so the accept and reject actions cannot be open at the
//! same time for different items.

use licensify_core::RequestStatus;

/// What confirming the dialog does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    /// File a license request; the comment is optional
    Request,
    Accept,
    Reject,
}

impl DialogAction {
    /// Status sent to the backend for an admin decision
    pub fn decision_status(&self) -> Option<RequestStatus> {
        match self {
            DialogAction::Request => None,
            DialogAction::Accept => Some(RequestStatus::Accepted),
            DialogAction::Reject => Some(RequestStatus::Rejected),
        }
    }

    pub fn requires_comment(&self) -> bool {
        !matches!(self, DialogAction::Request)
    }
}

impl std::fmt::Display for DialogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialogAction::Request => write!(f, "request"),
            DialogAction::Accept => write!(f, "accept"),
            DialogAction::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogState<T> {
    Closed,
    Composing {
        item: T,
        action: DialogAction,
        comment: String,
    },
    Submitting {
        item: T,
        action: DialogAction,
        comment: String,
    },
}

impl<T> Default for DialogState<T> {
    fn default() -> Self {
        DialogState::Closed
    }
}

/// Frozen dialog contents handed to the mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Submission<T> {
    pub item: T,
    pub action: DialogAction,
    pub comment: String,
}

impl<T: Clone> DialogState<T> {
    /// Open for `item`, replacing whatever was being composed
    pub fn open(&mut self, item: T, action: DialogAction) {
        *self = DialogState::Composing {
            item,
            action,
            comment: String::new(),
        };
    }

    /// Edit the comment draft; ignored unless composing
    pub fn set_comment(&mut self, text: impl Into<String>) {
        if let DialogState::Composing { comment, .. } = self {
            *comment = text.into();
        }
    }

    /// Move from composing to submitting and hand out the contents
    pub fn begin_submit(&mut self) -> Option<Submission<T>> {
        let DialogState::Composing {
            item,
            action,
            comment,
        } = self
        else {
            return None;
        };
        let submission = Submission {
            item: item.clone(),
            action: *action,
            comment: std::mem::take(comment),
        };
        *self = DialogState::Submitting {
            item: submission.item.clone(),
            action: submission.action,
            comment: submission.comment.clone(),
        };
        Some(submission)
    }

    pub fn close(&mut self) {
        *self = DialogState::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, DialogState::Submitting { .. })
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            DialogState::Closed => None,
            DialogState::Composing { item, .. } | DialogState::Submitting { item, .. } => {
                Some(item)
            }
        }
    }

    pub fn action(&self) -> Option<DialogAction> {
        match self {
            DialogState::Closed => None,
            DialogState::Composing { action, .. } | DialogState::Submitting { action, .. } => {
                Some(*action)
            }
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            DialogState::Closed => "",
            DialogState::Composing { comment, .. } | DialogState::Submitting { comment, .. } => {
                comment
            }
        }
    }
}

/// Result of confirming a dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Backend accepted the change and the list was re-fetched
    Completed,
    /// Backend call failed; the error was logged and the dialog closed anyway
    Failed(String),
    /// Nothing was sent
    Skipped,
}

impl MutationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, MutationOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_compose_submit() {
        let mut dialog: DialogState<&str> = DialogState::default();
        assert!(!dialog.is_open());
        assert_eq!(dialog.begin_submit(), None);

        dialog.open("r1", DialogAction::Accept);
        dialog.set_comment("looks fine");
        assert_eq!(dialog.comment(), "looks fine");

        let submission = dialog.begin_submit().unwrap();
        assert_eq!(submission.item, "r1");
        assert_eq!(submission.action, DialogAction::Accept);
        assert_eq!(submission.comment, "looks fine");
        assert!(dialog.is_submitting());

        // A second confirm while submitting sends nothing
        assert_eq!(dialog.begin_submit(), None);

        dialog.close();
        assert_eq!(dialog, DialogState::Closed);
    }

    #[test]
    fn test_reopening_replaces_item_and_action() {
        let mut dialog = DialogState::default();
        dialog.open("r1", DialogAction::Accept);
        dialog.set_comment("draft");
        dialog.open("r2", DialogAction::Reject);

        assert_eq!(dialog.item(), Some(&"r2"));
        assert_eq!(dialog.action(), Some(DialogAction::Reject));
        assert_eq!(dialog.comment(), "");
    }

    #[test]
    fn test_comment_ignored_when_closed() {
        let mut dialog: DialogState<u8> = DialogState::Closed;
        dialog.set_comment("nobody reads this");
        assert_eq!(dialog.comment(), "");
    }

    #[test]
    fn test_action_statuses() {
        assert_eq!(DialogAction::Request.decision_status(), None);
        assert_eq!(
            DialogAction::Reject.decision_status(),
            Some(RequestStatus::Rejected)
        );
        assert!(!DialogAction::Request.requires_comment());
        assert!(DialogAction::Accept.requires_comment());
    }
}
