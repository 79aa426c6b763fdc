//! Application workflow endpoints under `/api/userTemplate`.
//!
//! Every status change goes through [`change_status`], which checks the transition table and
//! records a composed remark. Regular users only ever see and touch their own applications.

use crate::error::{ApiError, ApiResult};
use crate::state::{now, AppState, Caller, Store};
use crate::{matches_text, ok, ok_with};
use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use filing_core::records::{
    ApplyTemplateRequest, Page, PageQuery, TemplateRegistry, TemplateStatistics, UserTemplate,
};
use filing_core::{compose_remark, is_transition_allowed, Actor, TemplateStatus};
use serde::Deserialize;

const NOT_FOUND: &str = "用户模板关系不存在";
const NOT_OWNER: &str = "无权操作他人的模板";

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/userTemplate/page", get(page))
        .route("/api/userTemplate/applyTemplate", post(apply))
        .route("/api/userTemplate/getTemplateContent", get(content))
        .route("/api/userTemplate/saveTemplateContent", post(save_content))
        .route("/api/userTemplate/submitForReview", post(submit_for_review))
        .route("/api/userTemplate/updateTemplateStatus", post(update_status))
        .route("/api/userTemplate/reviewTemplate", post(review))
        .route("/api/userTemplate/statistics", get(statistics))
        .route("/api/userTemplate/getTemplateDefinition", get(definition))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateIdParam {
    template_id: String,
}

#[derive(Debug, Deserialize)]
struct IdParam {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StatusParams {
    id: String,
    status: i32,
}

async fn page(
    caller: Caller,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<UserTemplate>> {
    let store = state.store.read().await;
    let owner = if caller.is_admin() {
        query.user_id.clone()
    } else {
        Some(caller.id.clone())
    };

    let items: Vec<UserTemplate> = store
        .user_templates
        .iter()
        .filter(|ut| owner.is_none() || ut.user_id == owner)
        .filter(|ut| query.status.is_none() || ut.status == query.status)
        .map(|ut| store.decorate(ut))
        .filter(|ut| matches_text(&ut.template_name, &query.template_name))
        .filter(|ut| matches_text(&ut.template_code, &query.template_code))
        .rev()
        .collect();

    ok(Page::from_items(
        items,
        query.page_num_or_default(),
        query.page_size_or_default(),
    ))
}

/// Users apply for themselves and wait for approval; administrators send the template straight
/// to the named users, ready to fill.
async fn apply(
    caller: Caller,
    State(state): State<AppState>,
    Query(param): Query<TemplateIdParam>,
    Json(req): Json<ApplyTemplateRequest>,
) -> ApiResult<Vec<String>> {
    let mut store = state.store.write().await;
    if store.template(&param.template_id).is_none() {
        return Err(ApiError::Failed("模板不存在".into()));
    }

    let user_ids = if req.user_ids.is_empty() {
        vec![caller.id.clone()]
    } else {
        req.user_ids
    };
    if !caller.is_admin() && user_ids.iter().any(|id| *id != caller.id) {
        return Err(ApiError::Forbidden);
    }
    if let Some(missing) = user_ids.iter().find(|id| store.account(id).is_none()) {
        return Err(ApiError::Failed(format!("用户 {missing} 不存在")));
    }

    let (status, remarks) = if caller.is_admin() {
        (TemplateStatus::PendingFill, "管理员发送模板")
    } else {
        (TemplateStatus::PendingApproval, "用户申请模板，等待审核")
    };

    let created = now();
    let mut ids = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        let id = uuid::Uuid::new_v4().to_string();
        store.user_templates.push(UserTemplate {
            id: id.clone(),
            user_id: Some(user_id),
            template_id: Some(param.template_id.clone()),
            content: None,
            status: Some(status.code()),
            remarks: Some(remarks.to_string()),
            create_time: Some(created),
            update_time: Some(created),
            ..UserTemplate::default()
        });
        ids.push(id);
    }

    tracing::info!(
        "template {} assigned by {} ({} applications)",
        param.template_id,
        caller.login_name,
        ids.len()
    );
    let message = if caller.is_admin() {
        "模板发送成功"
    } else {
        "模板申请成功"
    };
    ok_with(message, ids)
}

/// Look up an application the caller may act on.
fn owned<'s>(store: &'s mut Store, caller: &Caller, id: &str) -> Result<&'s mut UserTemplate, ApiError> {
    let item = store
        .user_template_mut(id)
        .ok_or_else(|| ApiError::Failed(NOT_FOUND.into()))?;
    if !caller.is_admin() && item.user_id.as_deref() != Some(caller.id.as_str()) {
        return Err(ApiError::Failed(NOT_OWNER.into()));
    }
    Ok(item)
}

async fn content(
    caller: Caller,
    State(state): State<AppState>,
    Query(param): Query<IdParam>,
) -> ApiResult<String> {
    let mut store = state.store.write().await;
    let item = owned(&mut store, &caller, &param.id)?;
    ok(item.content.clone().unwrap_or_default())
}

/// Store the form content. Saving starts (or resumes, after a return) the filling stage.
async fn save_content(
    caller: Caller,
    State(state): State<AppState>,
    Query(param): Query<IdParam>,
    body: String,
) -> ApiResult<String> {
    if let Err(e) = serde_json::from_str::<serde_json::Value>(&body) {
        return Err(ApiError::Validation(format!("内容格式不正确: {e}")));
    }

    let mut store = state.store.write().await;
    let item = owned(&mut store, &caller, &param.id)?;
    let status = item
        .template_status()
        .filter(|s| s.is_editable())
        .ok_or_else(|| ApiError::Failed("当前状态不允许编辑".into()))?;

    item.content = Some(body);
    item.update_time = Some(now());
    if matches!(status, TemplateStatus::PendingFill | TemplateStatus::Returned) {
        item.status = Some(TemplateStatus::Filling.code());
        tracing::debug!("application {} moved to filling", param.id);
    }
    ok_with("内容保存成功", "内容保存成功".to_string())
}

async fn submit_for_review(
    caller: Caller,
    State(state): State<AppState>,
    Query(param): Query<IdParam>,
) -> ApiResult<String> {
    let mut store = state.store.write().await;
    let item = owned(&mut store, &caller, &param.id)?;
    if item.template_status() != Some(TemplateStatus::Filling) {
        return Err(ApiError::Failed("只有填写中的模板可以提交审核".into()));
    }
    change_status(item, TemplateStatus::UnderReview, Actor::User, None)?;
    ok_with("提交审核成功", "提交审核成功".to_string())
}

async fn update_status(
    caller: Caller,
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
    remarks: String,
) -> ApiResult<String> {
    let next = parse_status(params.status)?;
    let actor = if caller.is_admin() { Actor::Admin } else { Actor::User };
    let mut store = state.store.write().await;
    let item = owned(&mut store, &caller, &params.id)?;
    change_status(item, next, actor, Some(remarks.as_str()))?;
    ok_with("状态更新成功", "状态更新成功".to_string())
}

async fn review(
    caller: Caller,
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
    remarks: String,
) -> ApiResult<String> {
    caller.require_admin()?;
    let next = parse_status(params.status)?;
    let mut store = state.store.write().await;
    let item = owned(&mut store, &caller, &params.id)?;
    change_status(item, next, Actor::Admin, Some(remarks.as_str()))?;
    tracing::info!("application {} reviewed by {}: {}", params.id, caller.login_name, next);
    ok_with("审核完成", "审核完成".to_string())
}

fn parse_status(code: i32) -> Result<TemplateStatus, ApiError> {
    TemplateStatus::from_code(code).map_err(|e| ApiError::Validation(e.to_string()))
}

/// Apply a checked transition and record its remark.
fn change_status(
    item: &mut UserTemplate,
    next: TemplateStatus,
    actor: Actor,
    remarks: Option<&str>,
) -> Result<(), ApiError> {
    let current = item
        .template_status()
        .ok_or_else(|| ApiError::Failed("当前状态不允许变更为目标状态".into()))?;
    if !is_transition_allowed(current, next, actor == Actor::Admin) {
        return Err(ApiError::Failed("当前状态不允许变更为目标状态".into()));
    }

    let remarks = remarks.map(str::trim).filter(|r| !r.is_empty());
    item.status = Some(next.code());
    item.remarks = Some(compose_remark(current, next, actor, remarks));
    item.update_time = Some(now());
    tracing::debug!("application {}: {} -> {}", item.id, current, next);
    Ok(())
}

async fn statistics(caller: Caller, State(state): State<AppState>) -> ApiResult<TemplateStatistics> {
    let store = state.store.read().await;
    let visible: Vec<&UserTemplate> = store
        .user_templates
        .iter()
        .filter(|ut| caller.is_admin() || ut.user_id.as_deref() == Some(caller.id.as_str()))
        .collect();
    let count = |status: TemplateStatus| {
        visible
            .iter()
            .filter(|ut| ut.status == Some(status.code()))
            .count() as u64
    };

    ok(TemplateStatistics {
        total_templates: store.templates.len() as u64,
        pending_count: count(TemplateStatus::PendingApproval),
        in_progress_count: count(TemplateStatus::UnderReview),
        approved_count: count(TemplateStatus::ReviewApproved),
        total_tasks: visible.len() as u64,
    })
}

async fn definition(
    caller: Caller,
    State(state): State<AppState>,
    Query(param): Query<TemplateIdParam>,
) -> ApiResult<TemplateRegistry> {
    let store = state.store.read().await;
    if !caller.is_admin() {
        let holds = store.user_templates.iter().any(|ut| {
            ut.user_id.as_deref() == Some(caller.id.as_str())
                && ut.template_id.as_deref() == Some(param.template_id.as_str())
        });
        if !holds {
            return Err(ApiError::BadRequest("无权访问此模板".into()));
        }
    }

    let template = store
        .template(&param.template_id)
        .cloned()
        .ok_or_else(|| ApiError::BadRequest("模板不存在".into()))?;
    ok(template)
}
