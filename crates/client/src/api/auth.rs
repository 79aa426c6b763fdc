//! Login, registration and session checks.

use crate::client::ApiClient;
use crate::error::ClientResult;
use filing_core::constants::LOGOUT_MESSAGE;
use filing_core::records::{LoginRequest, LoginResponse, PageQuery, RegisterRequest, UserAccount};
use filing_core::{Role, Session};
use reqwest::Method;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Log in as a regular user and establish the session.
    pub async fn login(&self, login_name: &str, password: &str) -> ClientResult<Session> {
        self.authenticate("/api/auth/login", login_name, password, None)
            .await
    }

    /// Log in through the administrator endpoint. Accounts without a role code are treated as
    /// administrators, since the endpoint only admits them.
    pub async fn admin_login(&self, login_name: &str, password: &str) -> ClientResult<Session> {
        self.authenticate("/api/auth/admin/login", login_name, password, Some(Role::Admin))
            .await
    }

    async fn authenticate(
        &self,
        path: &str,
        login_name: &str,
        password: &str,
        fallback_role: Option<Role>,
    ) -> ClientResult<Session> {
        let body = LoginRequest {
            login_name: login_name.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .client
            .fetch(self.client.request(Method::POST, path).json(&body))
            .await?;

        let role = match (response.role, fallback_role) {
            (None, Some(role)) => role,
            _ => response.role(),
        };
        let session = self.client.session().establish(
            response.token,
            role,
            response.user_id,
            response.user_name.or_else(|| Some(login_name.to_string())),
        )?;
        tracing::info!("logged in as {} ({})", login_name, role);
        Ok(session)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<UserAccount> {
        self.client
            .fetch(
                self.client
                    .request(Method::POST, "/api/auth/register")
                    .json(request),
            )
            .await
    }

    /// Whether the stored login is still accepted by the server.
    ///
    /// Probes the smallest user page. An unauthorized answer also clears the stored session
    /// through the client's middleware.
    pub async fn check_session(&self) -> bool {
        if self.client.session().token().is_none() {
            return false;
        }

        let probe = self
            .client
            .request(Method::GET, "/api/users/page")
            .query(&PageQuery::page(1, 1));
        match self.client.send::<serde_json::Value>(probe).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("session validation failed: {}", e);
                false
            }
        }
    }

    /// Forget the local session. The server keeps no login state, so nothing is sent.
    pub fn logout(&self) -> ClientResult<&'static str> {
        self.client.session().clear()?;
        Ok(LOGOUT_MESSAGE)
    }
}
