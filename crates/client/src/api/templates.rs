//! Template registry endpoints.

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use filing_core::records::{Page, PageQuery, TemplateRegistry};
use reqwest::Method;
use std::collections::BTreeSet;

/// Page size used when collecting the distinct template types.
pub const TYPE_SCAN_PAGE_SIZE: u64 = 100;

pub struct TemplatesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TemplatesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PageQuery) -> ClientResult<Page<TemplateRegistry>> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, "/api/templateRegistry/page")
                    .query(query),
            )
            .await
    }

    /// Templates visible without administrator rights.
    pub async fn public(&self, query: &PageQuery) -> ClientResult<Page<TemplateRegistry>> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, "/api/public/templates")
                    .query(query),
            )
            .await
    }

    pub async fn detail(&self, id: &str) -> ClientResult<TemplateRegistry> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, "/api/templateRegistry/getTemplateRegistryById")
                    .query(&[("id", id)]),
            )
            .await
    }

    /// Distinct, sorted template types found on the first [`TYPE_SCAN_PAGE_SIZE`] templates.
    pub async fn types(&self) -> ClientResult<Vec<String>> {
        let query = PageQuery {
            page_size: Some(TYPE_SCAN_PAGE_SIZE),
            ..PageQuery::default()
        };
        let page = self.list(&query).await?;
        let types: BTreeSet<String> = page
            .content
            .into_iter()
            .filter_map(|t| t.template_type)
            .filter(|t| !t.trim().is_empty())
            .collect();
        Ok(types.into_iter().collect())
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        if id.trim().is_empty() {
            return Err(ClientError::InvalidInput("模板ID不能为空".into()));
        }
        tracing::info!("deleting template {}", id);
        self.client
            .send::<serde_json::Value>(
                self.client
                    .request(Method::DELETE, "/api/templateRegistry/deleteTemplate")
                    .query(&[("id", id)]),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{client, ok};
    use crate::error::ClientError;
    use filing_core::records::PageQuery;
    use filing_core::Role;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn types_are_distinct_and_sorted() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/templateRegistry/page")
            .match_query(Matcher::UrlEncoded("pageSize".into(), "100".into()))
            .with_status(200)
            .with_body(ok(json!({"content": [
                {"id": "t1", "templateType": "语言模型"},
                {"id": "t2", "templateType": "图像模型"},
                {"id": "t3", "templateType": "语言模型"},
                {"id": "t4"},
                {"id": "t5", "templateType": " "}
            ]})))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::Admin);
        let types = api.templates().types().await.unwrap();
        assert_eq!(types, vec!["图像模型".to_string(), "语言模型".to_string()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_id_is_rejected_before_sending() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/templateRegistry/deleteTemplate")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (api, _) = client(&server, Role::Admin);
        let err = api.templates().delete("  ").await.unwrap_err();
        match err {
            ClientError::InvalidInput(message) => assert_eq!(message, "模板ID不能为空"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn detail_and_public_listing() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/templateRegistry/getTemplateRegistryById")
            .match_query(Matcher::UrlEncoded("id".into(), "t1".into()))
            .with_status(200)
            .with_body(ok(json!({"id": "t1", "templateName": "模型备案表"})))
            .create_async()
            .await;
        server
            .mock("GET", "/api/public/templates")
            .match_query(Matcher::UrlEncoded("templateType".into(), "语言模型".into()))
            .with_status(200)
            .with_body(ok(json!({"content": [{"id": "t1"}], "totalElements": 1})))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::User);
        let detail = api.templates().detail("t1").await.unwrap();
        assert_eq!(detail.template_name.as_deref(), Some("模型备案表"));

        let query = PageQuery {
            template_type: Some("语言模型".into()),
            ..PageQuery::default()
        };
        let page = api.templates().public(&query).await.unwrap();
        assert_eq!(page.total_elements, 1);
    }
}
