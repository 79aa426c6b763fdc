//! # Filing API REST
//!
//! In-memory development backend for the filing REST API.
//!
//! Handles:
//! - HTTP endpoints with axum, answering with the `{code, message, data}` envelope
//! - Bearer-token login for the seeded and registered accounts
//! - The user-template workflow, with transition checks and composed remarks
//!
//! Build the service with [`router`]; the workspace's `filing-run` binary serves it.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod state;
mod user_templates;

use axum::extract::{FromRequestParts, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use filing_core::records::{
    ApiEnvelope, LoginRequest, LoginResponse, Page, PageQuery, RegisterRequest, TemplateRegistry,
    UserAccount,
};
use filing_core::Role;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, Caller, Store};

const OK_MESSAGE: &str = "操作成功";

/// The complete service with permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/admin/login", post(admin_login))
        .route("/api/auth/register", post(register))
        .route("/api/users/page", get(list_users))
        .route("/api/public/templates", get(public_templates))
        .route("/api/templateRegistry/page", get(list_templates))
        .route("/api/templateRegistry/getTemplateRegistryById", get(template_detail))
        .route("/api/templateRegistry/deleteTemplate", delete(delete_template))
        .merge(user_templates::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiEnvelope::success(OK_MESSAGE, data)))
}

pub(crate) fn ok_with<T>(message: &str, data: T) -> ApiResult<T> {
    Ok(Json(ApiEnvelope::success(message, data)))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        state
            .store
            .read()
            .await
            .caller(token)
            .ok_or(ApiError::Unauthorized)
    }
}

impl Caller {
    pub(crate) fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[derive(Debug, Serialize)]
struct Health {
    ok: bool,
    message: String,
}

/// Liveness probe; needs no login.
async fn health() -> ApiResult<Health> {
    ok(Health {
        ok: true,
        message: "filing REST API is alive".into(),
    })
}

async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    authenticate(&state, req, false).await
}

async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    authenticate(&state, req, true).await
}

async fn authenticate(state: &AppState, req: LoginRequest, admin_only: bool) -> ApiResult<LoginResponse> {
    let mut store = state.store.write().await;
    let account = store
        .account_by_login(&req.login_name)
        .filter(|account| account.password == req.password)
        .cloned()
        .ok_or_else(|| ApiError::Failed("用户名或密码错误".into()))?;
    if admin_only && !account.role.is_admin() {
        return Err(ApiError::Failed("该账号不是管理员".into()));
    }

    let token = store.issue_token(&account.id);
    tracing::info!("{} logged in as {}", account.login_name, account.role);
    ok(LoginResponse {
        token,
        user_id: Some(account.id),
        user_name: Some(account.user_name),
        role: Some(account.role.code()),
    })
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<UserAccount> {
    let login_name = req.login_name.trim();
    if login_name.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("用户名和密码不能为空".into()));
    }

    let mut store = state.store.write().await;
    if store.account_by_login(login_name).is_some() {
        return Err(ApiError::Failed("用户名已存在".into()));
    }
    let user_name = if req.user_name.trim().is_empty() {
        login_name
    } else {
        req.user_name.trim()
    };
    let account = state::Account::new(login_name, &req.password, user_name, Role::User);
    let record = account.to_record();
    store.accounts.push(account);
    tracing::info!("registered account {}", login_name);
    ok_with("注册成功", record)
}

async fn list_users(
    caller: Caller,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<UserAccount>> {
    caller.require_admin()?;
    let store = state.store.read().await;
    let keyword = query.keyword.as_deref().unwrap_or_default();
    let users = store
        .accounts
        .iter()
        .filter(|a| keyword.is_empty() || a.login_name.contains(keyword) || a.user_name.contains(keyword))
        .map(state::Account::to_record)
        .collect();
    ok(Page::from_items(
        users,
        query.page_num_or_default(),
        query.page_size_or_default(),
    ))
}

/// Substring filter on an optional field. A missing or blank filter matches everything.
pub(crate) fn matches_text(value: &Option<String>, filter: &Option<String>) -> bool {
    match filter.as_deref().filter(|f| !f.is_empty()) {
        Some(filter) => value.as_deref().is_some_and(|v| v.contains(filter)),
        None => true,
    }
}

fn template_page(store: &Store, query: &PageQuery) -> Page<TemplateRegistry> {
    let matching = store
        .templates
        .iter()
        .filter(|t| matches_text(&t.template_name, &query.template_name))
        .filter(|t| matches_text(&t.template_code, &query.template_code))
        .filter(|t| matches_text(&t.template_type, &query.template_type))
        .cloned()
        .collect();
    Page::from_items(matching, query.page_num_or_default(), query.page_size_or_default())
}

async fn public_templates(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<TemplateRegistry>> {
    ok(template_page(&*state.store.read().await, &query))
}

async fn list_templates(
    caller: Caller,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<TemplateRegistry>> {
    caller.require_admin()?;
    ok(template_page(&*state.store.read().await, &query))
}

#[derive(Debug, Deserialize)]
struct IdParam {
    #[serde(default)]
    id: String,
}

async fn template_detail(
    caller: Caller,
    State(state): State<AppState>,
    Query(param): Query<IdParam>,
) -> ApiResult<TemplateRegistry> {
    caller.require_admin()?;
    let store = state.store.read().await;
    let template = store
        .template(&param.id)
        .cloned()
        .ok_or_else(|| ApiError::Failed("模板不存在".into()))?;
    ok(template)
}

async fn delete_template(
    caller: Caller,
    State(state): State<AppState>,
    Query(param): Query<IdParam>,
) -> ApiResult<()> {
    caller.require_admin()?;
    if param.id.trim().is_empty() {
        return Err(ApiError::Validation("模板ID不能为空".into()));
    }

    let mut store = state.store.write().await;
    let before = store.templates.len();
    store.templates.retain(|t| t.id != param.id);
    if store.templates.len() == before {
        return Err(ApiError::Failed("模板不存在".into()));
    }
    tracing::info!("template {} deleted by {}", param.id, caller.login_name);
    ok_with("删除成功", ())
}


#[cfg(test)]
mod tests {
    use super::test_support::{call, login};
    use super::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn app() -> Router {
        router(AppState::seeded())
    }

    #[tokio::test]
    async fn health_needs_no_login() {
        let res = call(&app(), Method::GET, "/health", None, None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["data"]["ok"], true);
    }

    #[tokio::test]
    async fn seeded_accounts_can_log_in() {
        let app = app();
        let body = json!({"loginName": "admin", "password": "admin123"}).to_string();
        let res = call(&app, Method::POST, "/api/auth/admin/login", None, Some(("application/json", body))).await;
        assert_eq!(res.body["code"], 200);
        assert_eq!(res.body["data"]["role"], 1);

        let body = json!({"loginName": "user", "password": "user123"}).to_string();
        let res = call(&app, Method::POST, "/api/auth/admin/login", None, Some(("application/json", body))).await;
        assert_eq!(res.body["code"], 500);
        assert_eq!(res.body["message"], "该账号不是管理员");

        let body = json!({"loginName": "user", "password": "nope"}).to_string();
        let res = call(&app, Method::POST, "/api/auth/login", None, Some(("application/json", body))).await;
        assert_eq!(res.body["message"], "用户名或密码错误");
    }

    #[tokio::test]
    async fn missing_or_unknown_token_is_401() {
        let app = app();
        let res = call(&app, Method::GET, "/api/users/page", None, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["code"], 401);

        let res = call(&app, Method::GET, "/api/users/page", Some("forged"), None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn user_listing_is_admin_only() {
        let app = app();
        let user = login(&app, "user", "user123").await;
        let res = call(&app, Method::GET, "/api/users/page?pageNum=1&pageSize=1", Some(&user), None).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.body["code"], 403);

        let admin = login(&app, "admin", "admin123").await;
        let res = call(&app, Method::GET, "/api/users/page?pageNum=1&pageSize=1", Some(&admin), None).await;
        assert_eq!(res.body["data"]["totalElements"], 2);
        assert_eq!(res.body["data"]["content"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn page_numbers_beyond_the_data_give_empty_pages() {
        let app = app();
        let admin = login(&app, "admin", "admin123").await;
        let uri = format!("/api/users/page?pageNum={}&pageSize=10", u64::MAX);
        let res = call(&app, Method::GET, &uri, Some(&admin), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["data"]["totalElements"], 2);
        assert!(res.body["data"]["content"].as_array().unwrap().is_empty());
    }

    #[test]
    fn blank_text_filters_match_everything() {
        let name = Some("语言模型".to_string());
        assert!(matches_text(&name, &None));
        assert!(matches_text(&name, &Some(String::new())));
        assert!(matches_text(&name, &Some("模型".into())));
        assert!(!matches_text(&name, &Some("图像".into())));
        assert!(!matches_text(&None, &Some("模型".into())));
    }

    #[tokio::test]
    async fn registered_accounts_are_users() {
        let app = app();
        let body = json!({"loginName": "carol", "password": "pw", "userName": "Carol"}).to_string();
        let res = call(&app, Method::POST, "/api/auth/register", None, Some(("application/json", body.clone()))).await;
        assert_eq!(res.body["code"], 200);
        assert_eq!(res.body["data"]["role"], 0);

        let again = call(&app, Method::POST, "/api/auth/register", None, Some(("application/json", body))).await;
        assert_eq!(again.body["message"], "用户名已存在");

        login(&app, "carol", "pw").await;
    }

    #[tokio::test]
    async fn public_templates_filter_by_type() {
        let res = call(
            &app(),
            Method::GET,
            "/api/public/templates?templateType=%E5%9B%BE%E5%83%8F%E6%A8%A1%E5%9E%8B",
            None,
            None,
        )
        .await;
        assert_eq!(res.body["data"]["totalElements"], 1);
        assert_eq!(res.body["data"]["content"][0]["templateCode"], "IMG-001");
    }

    #[tokio::test]
    async fn admin_deletes_templates() {
        let app = app();
        let admin = login(&app, "admin", "admin123").await;
        let list = call(&app, Method::GET, "/api/templateRegistry/page", Some(&admin), None).await;
        let id = list.body["data"]["content"][0]["id"].as_str().unwrap().to_string();

        let detail = call(
            &app,
            Method::GET,
            &format!("/api/templateRegistry/getTemplateRegistryById?id={id}"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(detail.body["data"]["id"], id.as_str());

        let empty = call(&app, Method::DELETE, "/api/templateRegistry/deleteTemplate?id=", Some(&admin), None).await;
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);
        assert_eq!(empty.body["message"], "模板ID不能为空");

        let uri = format!("/api/templateRegistry/deleteTemplate?id={id}");
        let res = call(&app, Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(res.body["code"], 200);
        let res = call(&app, Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(res.body["message"], "模板不存在");
    }
}
