//! Filing records.

use crate::client::ApiClient;
use crate::error::ClientResult;
use filing_core::records::{Filing, Page, PageQuery, ReviewDecision};
use reqwest::Method;

pub struct FilingsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FilingsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PageQuery) -> ClientResult<Page<Filing>> {
        self.client
            .fetch(self.client.request(Method::GET, "/api/filings/page").query(query))
            .await
    }

    pub async fn detail(&self, id: &str) -> ClientResult<Filing> {
        self.client
            .fetch(self.client.request(Method::GET, &format!("/api/filings/{id}")))
            .await
    }

    pub async fn create(&self, filing: &Filing) -> ClientResult<Filing> {
        self.client
            .fetch(self.client.request(Method::POST, "/api/filings").json(filing))
            .await
    }

    pub async fn update(&self, id: &str, filing: &Filing) -> ClientResult<Filing> {
        self.client
            .fetch(
                self.client
                    .request(Method::PUT, &format!("/api/filings/{id}"))
                    .json(filing),
            )
            .await
    }

    pub async fn submit(&self, id: &str) -> ClientResult<()> {
        self.client
            .send::<serde_json::Value>(
                self.client
                    .request(Method::POST, &format!("/api/filings/{id}/submit")),
            )
            .await?;
        Ok(())
    }

    pub async fn review(&self, id: &str, decision: &ReviewDecision) -> ClientResult<()> {
        self.client
            .send::<serde_json::Value>(
                self.client
                    .request(Method::POST, &format!("/api/filings/{id}/review"))
                    .json(decision),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.client
            .send::<serde_json::Value>(
                self.client
                    .request(Method::DELETE, &format!("/api/filings/{id}")),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{client, ok};
    use crate::error::ErrorClass;
    use filing_core::records::{Filing, PageQuery, ReviewDecision};
    use filing_core::Role;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn create_then_submit() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/filings")
            .match_body(Matcher::PartialJson(json!({"title": "备案一", "modelName": "m1"})))
            .with_status(200)
            .with_body(ok(json!({"id": "f-1", "title": "备案一", "modelName": "m1"})))
            .create_async()
            .await;
        let submit = server
            .mock("POST", "/api/filings/f-1/submit")
            .with_status(200)
            .with_body(ok(json!(null)))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::User);
        let mut draft = Filing {
            title: Some("备案一".into()),
            ..Filing::default()
        };
        draft.extra.insert("modelName".into(), json!("m1"));

        let created = api.filings().create(&draft).await.unwrap();
        let id = created.id.expect("id");
        api.filings().submit(&id).await.unwrap();

        create.assert_async().await;
        submit.assert_async().await;
    }

    #[tokio::test]
    async fn review_posts_decision() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/filings/f-1/review")
            .match_body(Matcher::Json(json!({"status": 6, "remarks": "通过"})))
            .with_status(200)
            .with_body(ok(json!(null)))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::Admin);
        let decision = ReviewDecision {
            status: 6,
            remarks: Some("通过".into()),
        };
        api.filings().review("f-1", &decision).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_filing_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/filings/nope")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/api/filings/page")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(ok(json!({"content": [], "totalElements": 0})))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::User);
        let err = api.filings().detail("nope").await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotFound);

        let page = api.filings().list(&PageQuery::page(1, 10)).await.unwrap();
        assert!(page.content.is_empty());
    }
}
