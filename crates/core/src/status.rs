//! User-template status model.
//!
//! A user-template (an application for a template, later the filled-in content) moves through
//! eight integer-coded statuses. The codes are part of the REST contract and are serialised as
//! plain integers.
//!
//! Two lifecycles share the same code space:
//! - application: `PendingApproval` -> `PendingFill` | `ApplicationRejected`
//! - content: `PendingFill` -> `Filling` -> `UnderReview` -> `ReviewApproved` | `Returned`

use crate::{FilingError, FilingResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for codes outside the known range.
pub const UNKNOWN_STATUS_LABEL: &str = "未知";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TemplateStatus {
    /// Initial status after a user applies for a template.
    PendingApproval,
    ApplicationApproved,
    ApplicationRejected,
    /// Initial status when an administrator sends a template to a user.
    PendingFill,
    /// Content saved but not yet submitted.
    Filling,
    UnderReview,
    ReviewApproved,
    /// Sent back to the user for changes.
    Returned,
}

impl TemplateStatus {
    pub const ALL: [TemplateStatus; 8] = [
        TemplateStatus::PendingApproval,
        TemplateStatus::ApplicationApproved,
        TemplateStatus::ApplicationRejected,
        TemplateStatus::PendingFill,
        TemplateStatus::Filling,
        TemplateStatus::UnderReview,
        TemplateStatus::ReviewApproved,
        TemplateStatus::Returned,
    ];

    pub fn code(self) -> i32 {
        match self {
            Self::PendingApproval => 0,
            Self::ApplicationApproved => 1,
            Self::ApplicationRejected => 2,
            Self::PendingFill => 3,
            Self::Filling => 4,
            Self::UnderReview => 5,
            Self::ReviewApproved => 6,
            Self::Returned => 7,
        }
    }

    pub fn from_code(code: i32) -> FilingResult<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(FilingError::UnknownStatus(code))
    }

    /// Display label, as shown to users and embedded in remarks.
    pub fn label(self) -> &'static str {
        match self {
            Self::PendingApproval => "待审核",
            Self::ApplicationApproved => "申请通过",
            Self::ApplicationRejected => "拒绝申请",
            Self::PendingFill => "待填写",
            Self::Filling => "填写中",
            Self::UnderReview => "审核中",
            Self::ReviewApproved => "审核通过",
            Self::Returned => "退回",
        }
    }

    /// Whether a user may still edit the content in this status.
    pub fn is_editable(self) -> bool {
        matches!(self, Self::PendingFill | Self::Filling | Self::Returned)
    }
}

impl TryFrom<i32> for TemplateStatus {
    type Error = FilingError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<TemplateStatus> for i32 {
    fn from(status: TemplateStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for a raw, possibly unknown or missing, status code.
pub fn status_description(code: Option<i32>) -> &'static str {
    code.and_then(|code| TemplateStatus::from_code(code).ok())
        .map(TemplateStatus::label)
        .unwrap_or(UNKNOWN_STATUS_LABEL)
}

/// Check whether `current -> next` is permitted for the acting party.
///
/// Regular users may only submit filled content for review. Administrators are restricted on the
/// two review points (application approval and content review) and unrestricted elsewhere.
pub fn is_transition_allowed(current: TemplateStatus, next: TemplateStatus, is_admin: bool) -> bool {
    if !is_admin {
        return current == TemplateStatus::Filling && next == TemplateStatus::UnderReview;
    }

    match current {
        TemplateStatus::PendingApproval => matches!(
            next,
            TemplateStatus::PendingFill | TemplateStatus::ApplicationRejected
        ),
        TemplateStatus::UnderReview => matches!(
            next,
            TemplateStatus::ReviewApproved | TemplateStatus::Returned
        ),
        _ => true,
    }
}

/// Select-list entry for status filters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
    pub value: String,
    pub label: String,
}

/// All statuses as `{ value: "<code>", label }` options, in code order.
pub fn status_options() -> Vec<StatusOption> {
    TemplateStatus::ALL
        .iter()
        .map(|status| StatusOption {
            value: status.code().to_string(),
            label: status.label().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use TemplateStatus::*;

    #[test]
    fn codes_round_trip() {
        for status in TemplateStatus::ALL {
            assert_eq!(TemplateStatus::from_code(status.code()).unwrap(), status);
        }
        assert!(matches!(
            TemplateStatus::from_code(8),
            Err(FilingError::UnknownStatus(8))
        ));
    }

    #[test]
    fn serialises_as_integer() {
        assert_eq!(serde_json::to_string(&UnderReview).unwrap(), "5");
        let parsed: TemplateStatus = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, Returned);
        assert!(serde_json::from_str::<TemplateStatus>("42").is_err());
    }

    #[test]
    fn describes_unknown_codes() {
        assert_eq!(status_description(Some(6)), "审核通过");
        assert_eq!(status_description(Some(-1)), "未知");
        assert_eq!(status_description(None), "未知");
    }

    #[test]
    fn users_may_only_submit() {
        assert!(is_transition_allowed(Filling, UnderReview, false));
        for current in TemplateStatus::ALL {
            for next in TemplateStatus::ALL {
                if (current, next) != (Filling, UnderReview) {
                    assert!(!is_transition_allowed(current, next, false));
                }
            }
        }
    }

    #[test]
    fn admins_are_restricted_at_review_points() {
        assert!(is_transition_allowed(PendingApproval, PendingFill, true));
        assert!(is_transition_allowed(PendingApproval, ApplicationRejected, true));
        assert!(!is_transition_allowed(PendingApproval, ReviewApproved, true));

        assert!(is_transition_allowed(UnderReview, ReviewApproved, true));
        assert!(is_transition_allowed(UnderReview, Returned, true));
        assert!(!is_transition_allowed(UnderReview, Filling, true));

        assert!(is_transition_allowed(Returned, Filling, true));
        assert!(is_transition_allowed(ReviewApproved, PendingFill, true));
    }

    #[test]
    fn options_cover_every_status() {
        let options = status_options();
        assert_eq!(options.len(), 8);
        assert_eq!(options[0].value, "0");
        assert_eq!(options[0].label, "待审核");
        assert_eq!(options[7].value, "7");
        assert_eq!(options[7].label, "退回");
    }
}
