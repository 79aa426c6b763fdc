//! Account management (administrators only).

use crate::client::ApiClient;
use crate::error::ClientResult;
use filing_core::records::{Page, PageQuery, PasswordReset, UserAccount, UserUpdate};
use reqwest::Method;

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PageQuery) -> ClientResult<Page<UserAccount>> {
        self.client
            .fetch(self.client.request(Method::GET, "/api/users/page").query(query))
            .await
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> ClientResult<UserAccount> {
        self.client
            .fetch(
                self.client
                    .request(Method::PUT, &format!("/api/users/{id}"))
                    .json(update),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.client
            .send::<serde_json::Value>(self.client.request(Method::DELETE, &format!("/api/users/{id}")))
            .await?;
        Ok(())
    }

    pub async fn reset_password(&self, id: &str, new_password: &str) -> ClientResult<()> {
        let body = PasswordReset {
            new_password: new_password.to_string(),
        };
        self.client
            .send::<serde_json::Value>(
                self.client
                    .request(Method::PUT, &format!("/api/users/{id}/reset-password"))
                    .json(&body),
            )
            .await?;
        Ok(())
    }
}
