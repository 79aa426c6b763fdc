//! Remark annotation protocol.
//!
//! A remark is a single string attached to a user-template status change. The backend builds it
//! from two parts:
//!
//! - a machine-generated description of the transition and the acting party, e.g.
//!   `状态从【填写中】变更为【审核中】，用户操作，提交审核`
//! - an optional comment typed by a person, appended after [`REMARK_DELIMITER`]
//!
//! This module splits such strings back into their parts for display, and also provides the
//! composer used by the development backend.
//!
//! All parsing functions are total: absent or empty input yields `""`, never an error. Returned
//! segments borrow from the input.

use crate::status::TemplateStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the system segment and the user segment (`，备注：`).
pub const REMARK_DELIMITER: &str = "，备注：";

/// Phrases that only ever appear in machine-generated remark text.
///
/// Used to classify a remark without a delimiter. A user comment that happens to contain one of
/// these phrases is classified as system text.
pub const SYSTEM_MARKERS: [&str; 8] = [
    "状态从【",
    "管理员操作",
    "用户操作",
    "审核通过",
    "退回修改",
    "申请通过",
    "拒绝申请",
    "提交审核",
];

/// The two logical segments of a remark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemarkParts<'a> {
    /// Transition and actor description. Empty when the remark holds only user text.
    pub status_change: &'a str,
    /// Free text entered by a person. Empty when there is none.
    pub user_remark: &'a str,
}

impl<'a> RemarkParts<'a> {
    pub fn has_user_remark(&self) -> bool {
        !self.user_remark.is_empty()
    }
}

/// Split a remark into its status-change and user segments.
///
/// When [`REMARK_DELIMITER`] is present the split happens at its first occurrence and both sides
/// are trimmed. Otherwise the whole (trimmed) string goes to one side: the status-change segment
/// if it contains any of [`SYSTEM_MARKERS`], the user segment if not.
pub fn split_remark<'a>(raw: impl Into<Option<&'a str>>) -> RemarkParts<'a> {
    let raw = match raw.into() {
        Some(raw) if !raw.is_empty() => raw,
        _ => return RemarkParts::default(),
    };

    if let Some((status_change, user_remark)) = raw.split_once(REMARK_DELIMITER) {
        return RemarkParts {
            status_change: status_change.trim(),
            user_remark: user_remark.trim(),
        };
    }

    if is_system_text(raw) {
        RemarkParts {
            status_change: raw.trim(),
            user_remark: "",
        }
    } else {
        RemarkParts {
            status_change: "",
            user_remark: raw.trim(),
        }
    }
}

/// Whether `text` contains any of the [`SYSTEM_MARKERS`].
pub fn is_system_text(text: &str) -> bool {
    SYSTEM_MARKERS.iter().any(|marker| text.contains(marker))
}

/// The user-entered part of a remark, or `""`.
pub fn extract_user_remark<'a>(raw: impl Into<Option<&'a str>>) -> &'a str {
    split_remark(raw).user_remark
}

/// The machine-generated status-change part of a remark, or `""`.
pub fn extract_status_change_info<'a>(raw: impl Into<Option<&'a str>>) -> &'a str {
    split_remark(raw).status_change
}

/// Whether the remark carries any user-entered text.
pub fn has_user_remark<'a>(raw: impl Into<Option<&'a str>>) -> bool {
    split_remark(raw).has_user_remark()
}

/// Which part of a remark to show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DisplayMode {
    /// Only what the user typed.
    #[default]
    User,
    /// Only the status-change description.
    System,
    /// The remark exactly as stored.
    Full,
}

impl DisplayMode {
    /// Parse a mode name, treating anything unrecognised as [`DisplayMode::Full`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "user" => Self::User,
            "system" => Self::System,
            _ => Self::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
            Self::Full => "full",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl From<String> for DisplayMode {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select the part of a remark to display.
///
/// [`DisplayMode::Full`] returns the input unchanged (untrimmed). Absent or empty input yields
/// `""` for every mode.
pub fn format_remark_for_display<'a>(raw: impl Into<Option<&'a str>>, mode: DisplayMode) -> &'a str {
    let raw = match raw.into() {
        Some(raw) if !raw.is_empty() => raw,
        _ => return "",
    };

    match mode {
        DisplayMode::User => extract_user_remark(raw),
        DisplayMode::System => extract_status_change_info(raw),
        DisplayMode::Full => raw,
    }
}

/// Who performed a status change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor {
    Admin,
    User,
}

/// Build the remark recorded for a status change.
///
/// The output always starts with the transition description, followed by the actor phrase and,
/// for some transitions, a fixed summary phrase. A non-empty `user_remark` is appended after
/// [`REMARK_DELIMITER`] verbatim.
pub fn compose_remark(
    from: TemplateStatus,
    to: TemplateStatus,
    actor: Actor,
    user_remark: Option<&str>,
) -> String {
    let mut remark = format!("状态从【{}】变更为【{}】", from.label(), to.label());

    match actor {
        Actor::Admin => {
            remark.push_str("，管理员操作");
            let summary = match to {
                TemplateStatus::ReviewApproved => Some("，审核通过"),
                TemplateStatus::Returned => Some("，退回修改"),
                TemplateStatus::ApplicationApproved => Some("，申请通过"),
                TemplateStatus::ApplicationRejected => Some("，拒绝申请"),
                _ => None,
            };
            if let Some(summary) = summary {
                remark.push_str(summary);
            }
        }
        Actor::User => {
            remark.push_str("，用户操作");
            if from == TemplateStatus::Filling && to == TemplateStatus::UnderReview {
                remark.push_str("，提交审核");
            }
        }
    }

    if let Some(text) = user_remark.filter(|text| !text.is_empty()) {
        remark.push_str(REMARK_DELIMITER);
        remark.push_str(text);
    }

    remark
}
