//! Applications for templates and the fill/submit/review workflow on them.

use crate::api::with_remarks;
use crate::client::ApiClient;
use crate::error::ClientResult;
use filing_core::records::{
    ApplyTemplateRequest, Page, PageQuery, TemplateRegistry, TemplateStatistics, UserTemplate,
};
use filing_core::{status_options, StatusOption, TemplateStatus};
use reqwest::Method;

pub struct UserTemplatesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserTemplatesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Applications visible to the caller: their own, or all of them for administrators.
    pub async fn page(&self, query: &PageQuery) -> ClientResult<Page<UserTemplate>> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, "/api/userTemplate/page")
                    .query(query),
            )
            .await
    }

    /// Apply for a template. With no `user_ids` the application is for the caller; an
    /// administrator may name other users to hand the template out directly.
    ///
    /// Returns the ids of the created applications.
    pub async fn apply(&self, template_id: &str, user_ids: &[String]) -> ClientResult<Vec<String>> {
        let body = ApplyTemplateRequest {
            user_ids: user_ids.to_vec(),
        };
        self.client
            .fetch(
                self.client
                    .request(Method::POST, "/api/userTemplate/applyTemplate")
                    .query(&[("templateId", template_id)])
                    .json(&body),
            )
            .await
    }

    /// The filled-in form content of an application, as JSON text.
    pub async fn content(&self, id: &str) -> ClientResult<String> {
        let envelope = self
            .client
            .send::<String>(
                self.client
                    .request(Method::GET, "/api/userTemplate/getTemplateContent")
                    .query(&[("id", id)]),
            )
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn save_content(&self, id: &str, content: &serde_json::Value) -> ClientResult<()> {
        self.client
            .send::<serde_json::Value>(
                self.client
                    .request(Method::POST, "/api/userTemplate/saveTemplateContent")
                    .query(&[("id", id)])
                    .json(content),
            )
            .await?;
        Ok(())
    }

    /// Review submitted content (administrators).
    pub async fn review(
        &self,
        id: &str,
        status: TemplateStatus,
        remarks: Option<&str>,
    ) -> ClientResult<()> {
        self.post_status("/api/userTemplate/reviewTemplate", id, status, remarks)
            .await
    }

    /// Approve or reject an application (administrators). An approved application becomes
    /// ready to fill.
    pub async fn review_application(
        &self,
        id: &str,
        approved: bool,
        remarks: Option<&str>,
    ) -> ClientResult<()> {
        let status = if approved {
            TemplateStatus::PendingFill
        } else {
            TemplateStatus::ApplicationRejected
        };
        self.review(id, status, remarks).await
    }

    pub async fn submit_for_review(&self, id: &str) -> ClientResult<()> {
        self.client
            .send::<serde_json::Value>(
                self.client
                    .request(Method::POST, "/api/userTemplate/submitForReview")
                    .query(&[("id", id)]),
            )
            .await?;
        Ok(())
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: TemplateStatus,
        remarks: Option<&str>,
    ) -> ClientResult<()> {
        self.post_status("/api/userTemplate/updateTemplateStatus", id, status, remarks)
            .await
    }

    async fn post_status(
        &self,
        path: &str,
        id: &str,
        status: TemplateStatus,
        remarks: Option<&str>,
    ) -> ClientResult<()> {
        let builder = self
            .client
            .request(Method::POST, path)
            .query(&[("id", id.to_string()), ("status", status.code().to_string())]);
        self.client
            .send::<serde_json::Value>(with_remarks(builder, remarks))
            .await?;
        Ok(())
    }

    pub async fn statistics(&self) -> ClientResult<TemplateStatistics> {
        self.client
            .fetch(self.client.request(Method::GET, "/api/userTemplate/statistics"))
            .await
    }

    /// The template definition behind an application; regular users only see templates they
    /// hold an application for.
    pub async fn definition(&self, template_id: &str) -> ClientResult<TemplateRegistry> {
        self.client
            .fetch(
                self.client
                    .request(Method::GET, "/api/userTemplate/getTemplateDefinition")
                    .query(&[("templateId", template_id)]),
            )
            .await
    }

    /// Status filter options. Answered locally.
    pub fn status_options(&self) -> Vec<StatusOption> {
        status_options()
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{client, ok};
    use crate::error::ErrorClass;
    use filing_core::records::PageQuery;
    use filing_core::{DisplayMode, Role, TemplateStatus};
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn apply_without_users_sends_empty_object() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/userTemplate/applyTemplate")
            .match_query(Matcher::UrlEncoded("templateId".into(), "t1".into()))
            .match_header("content-type", "application/json")
            .match_body(Matcher::Exact("{}".into()))
            .with_status(200)
            .with_body(ok(json!(["ut-1"])))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::User);
        let ids = api.user_templates().apply("t1", &[]).await.unwrap();
        assert_eq!(ids, vec!["ut-1".to_string()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn apply_for_named_users() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/userTemplate/applyTemplate")
            .match_query(Matcher::UrlEncoded("templateId".into(), "t1".into()))
            .match_body(Matcher::Json(json!({"userIds": ["u-2", "u-3"]})))
            .with_status(200)
            .with_body(ok(json!(["ut-2", "ut-3"])))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::Admin);
        let ids = api
            .user_templates()
            .apply("t1", &["u-2".to_string(), "u-3".to_string()])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn review_sends_status_and_plain_text_remarks() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/userTemplate/reviewTemplate")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "ut-1".into()),
                Matcher::UrlEncoded("status".into(), "7".into()),
            ]))
            .match_header("content-type", Matcher::Regex("^text/plain".into()))
            .match_body(Matcher::Exact("请补充训练数据说明".into()))
            .with_status(200)
            .with_body(ok(json!(null)))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::Admin);
        api.user_templates()
            .review("ut-1", TemplateStatus::Returned, Some("请补充训练数据说明"))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn approving_an_application_moves_it_to_pending_fill() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/userTemplate/reviewTemplate")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "ut-1".into()),
                Matcher::UrlEncoded("status".into(), "3".into()),
            ]))
            .with_status(200)
            .with_body(ok(json!(null)))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::Admin);
        api.user_templates()
            .review_application("ut-1", true, None)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn content_round_trips_through_save() {
        let mut server = Server::new_async().await;
        let save = server
            .mock("POST", "/api/userTemplate/saveTemplateContent")
            .match_query(Matcher::UrlEncoded("id".into(), "ut-1".into()))
            .match_body(Matcher::Json(json!({"modelName": "m1"})))
            .with_status(200)
            .with_body(ok(json!("保存成功")))
            .create_async()
            .await;
        server
            .mock("GET", "/api/userTemplate/getTemplateContent")
            .match_query(Matcher::UrlEncoded("id".into(), "ut-1".into()))
            .with_status(200)
            .with_body(ok(json!(r#"{"modelName":"m1"}"#)))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::User);
        api.user_templates()
            .save_content("ut-1", &json!({"modelName": "m1"}))
            .await
            .unwrap();
        let content = api.user_templates().content("ut-1").await.unwrap();
        assert_eq!(content, r#"{"modelName":"m1"}"#);
        save.assert_async().await;
    }

    #[tokio::test]
    async fn page_exposes_parsed_remarks() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/userTemplate/page")
            .match_query(Matcher::UrlEncoded("status".into(), "7".into()))
            .with_status(200)
            .with_body(ok(json!({"content": [{
                "id": "ut-1",
                "status": 7,
                "remarks": "状态从【审核中】变更为【退回】，管理员操作，退回修改，备注：缺少附件"
            }], "totalElements": 1})))
            .create_async()
            .await;

        let (api, _) = client(&server, Role::User);
        let query = PageQuery {
            status: Some(TemplateStatus::Returned.code()),
            ..PageQuery::default()
        };
        let page = api.user_templates().page(&query).await.unwrap();
        let item = &page.content[0];
        assert_eq!(item.remark_for_display(DisplayMode::User), "缺少附件");
        assert_eq!(item.status_label(), "退回");
    }

    #[tokio::test]
    async fn statistics_and_definition() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/userTemplate/statistics")
            .with_status(200)
            .with_body(ok(json!({
                "totalTemplates": 2,
                "pendingCount": 1,
                "inProgressCount": 3,
                "approvedCount": 4,
                "totalTasks": 9
            })))
            .create_async()
            .await;
        server
            .mock("GET", "/api/userTemplate/getTemplateDefinition")
            .match_query(Matcher::UrlEncoded("templateId".into(), "t9".into()))
            .with_status(400)
            .with_body(r#"{"code":500,"message":"无权访问此模板"}"#)
            .create_async()
            .await;

        let (api, _) = client(&server, Role::User);
        let stats = api.user_templates().statistics().await.unwrap();
        assert_eq!(stats.total_tasks, 9);

        let err = api.user_templates().definition("t9").await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::BadRequest);
        assert!(err.to_string().contains("无权访问此模板"));
    }

    #[tokio::test]
    async fn status_options_need_no_server() {
        let server = Server::new_async().await;
        let (api, _) = client(&server, Role::User);
        let options = api.user_templates().status_options();
        assert_eq!(options.len(), 8);
        assert_eq!(options[7].label, "退回");
    }
}
