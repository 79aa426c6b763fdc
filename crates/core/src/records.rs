//! Wire records exchanged with the filing REST API.
//!
//! All records use camelCase field names on the wire. Timestamps are zone-less local date-times
//! (`2024-05-01T09:30:00`), so they map to [`chrono::NaiveDateTime`].
//!
//! Status codes on [`UserTemplate`] are kept raw: the backend may hand out codes this crate does
//! not know, and a listing should still deserialize.

use crate::constants::{DEFAULT_ERROR_MESSAGE, SUCCESS_CODE};
use crate::remark::{format_remark_for_display, split_remark, DisplayMode, RemarkParts};
use crate::session::Role;
use crate::status::{status_description, TemplateStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Response envelope wrapping every JSON payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn failed(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// The envelope message, or the generic failure text when there is none.
    pub fn message_or_default(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u64,
    /// Zero-based page index.
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub size: u64,
}

impl<T> Page<T> {
    /// Slice `items` into the one-based page `page_num` of `page_size` entries.
    pub fn from_items(items: Vec<T>, page_num: u64, page_size: u64) -> Self {
        let size = page_size.max(1);
        let total_elements = items.len() as u64;
        let index = page_num.max(1) - 1;
        let offset = usize::try_from(index.saturating_mul(size)).unwrap_or(usize::MAX);
        let content = items
            .into_iter()
            .skip(offset)
            .take(usize::try_from(size).unwrap_or(usize::MAX))
            .collect();

        Self {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(size),
            number: index,
            size,
        }
    }
}

/// Paging and filter parameters for list endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_num: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl PageQuery {
    pub fn page(page_num: u64, page_size: u64) -> Self {
        Self {
            page_num: Some(page_num),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn page_num_or_default(&self) -> u64 {
        self.page_num.unwrap_or(1)
    }

    pub fn page_size_or_default(&self) -> u64 {
        self.page_size.unwrap_or(10)
    }
}

/// A template definition registered by an administrator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRegistry {
    pub id: String,
    #[serde(default)]
    pub template_code: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub template_description: Option<String>,
    #[serde(default)]
    pub template_type: Option<String>,
    /// JSON form definition, as a string.
    #[serde(default)]
    pub template_content: Option<String>,
    #[serde(default)]
    pub create_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub update_time: Option<NaiveDateTime>,
}

/// A user's instance of a template: the application and, later, the filled-in content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTemplate {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<i32>,
    /// Composite remark of the last status change.
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub create_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub update_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub template_code: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub template_description: Option<String>,
    #[serde(default)]
    pub template_type: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub status_desc: Option<String>,
}

impl UserTemplate {
    /// The typed status, if the code is known.
    pub fn template_status(&self) -> Option<TemplateStatus> {
        self.status
            .and_then(|code| TemplateStatus::from_code(code).ok())
    }

    /// The status label, preferring the backend's description.
    pub fn status_label(&self) -> &str {
        self.status_desc
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| status_description(self.status))
    }

    pub fn remark_parts(&self) -> RemarkParts<'_> {
        split_remark(self.remarks.as_deref())
    }

    pub fn remark_for_display(&self, mode: DisplayMode) -> &str {
        format_remark_for_display(self.remarks.as_deref(), mode)
    }
}

/// A system account as listed by the user-management endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: String,
    #[serde(default)]
    pub login_name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    /// `1` for administrators, anything else for regular users.
    #[serde(default)]
    pub role: Option<i32>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub create_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_login_time: Option<NaiveDateTime>,
}

/// Editable account fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub new_password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_name: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    /// Role code as stored on the account.
    #[serde(default)]
    pub role: Option<i32>,
}

impl LoginResponse {
    pub fn role(&self) -> Role {
        Role::from_code(self.role)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub login_name: String,
    pub password: String,
    pub user_name: String,
}

/// Counters shown on the administrator dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStatistics {
    #[serde(default)]
    pub total_templates: u64,
    /// Applications waiting for approval.
    #[serde(default)]
    pub pending_count: u64,
    /// Content under review.
    #[serde(default)]
    pub in_progress_count: u64,
    #[serde(default)]
    pub approved_count: u64,
    #[serde(default)]
    pub total_tasks: u64,
}

/// Body of a template application.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTemplateRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_ids: Vec<String>,
}

/// A filing record.
///
/// Only the common fields are typed; anything else the backend sends is preserved in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Reviewer decision on a filing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDecision {
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}
