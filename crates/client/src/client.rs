//! The single HTTP client for the filing REST API.
//!
//! [`ApiClient`] owns a `reqwest::Client` configured with the base URL and timeout, plus the
//! middleware pipeline. Endpoint wrappers in [`crate::api`] build requests with
//! [`ApiClient::request`] and send them with one of:
//!
//! - [`ApiClient::send`] for JSON envelope responses,
//! - [`ApiClient::fetch`] when the envelope must carry data,
//! - [`ApiClient::send_raw`] for binary downloads.

use crate::error::{ClientError, ClientResult};
use crate::middleware::{BearerAuth, ErrorLog, Middleware, RawResponse, RequestLog, SessionInvalidation};
use bytes::Bytes;
use filing_core::constants::DEFAULT_TIMEOUT_MS;
use filing_core::records::ApiEnvelope;
use filing_core::{FilingConfig, SessionContext};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
    middleware: Arc<Vec<Arc<dyn Middleware>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
    session: Arc<SessionContext>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl ApiClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append a middleware; stages run in the order they were added.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Install the standard pipeline: request log, bearer auth, session invalidation on 401,
    /// error log.
    pub fn with_default_middleware(self) -> Self {
        let session = self.session.clone();
        self.with(RequestLog)
            .with(BearerAuth::new(session.clone()))
            .with(SessionInvalidation::new(session))
            .with(ErrorLog)
    }

    pub fn build(self) -> ClientResult<ApiClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ClientError::Transport)?;

        Ok(ApiClient {
            http,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            session: self.session,
            middleware: Arc::new(self.middleware),
        })
    }
}

impl ApiClient {
    /// Start building a client with no middleware and the default timeout.
    pub fn builder(base_url: impl Into<String>, session: Arc<SessionContext>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            session,
            middleware: Vec::new(),
        }
    }

    /// A client for the configured API with the standard middleware pipeline.
    pub fn from_config(config: &FilingConfig, session: Arc<SessionContext>) -> ClientResult<Self> {
        Self::builder(config.api_base_url(), session)
            .timeout(config.timeout())
            .with_default_middleware()
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Start a request for `path` (relative to the base URL).
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Send a request and normalise its JSON envelope.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] for a non-2xx status (the message is taken from the body's
    ///   envelope when there is one),
    /// - [`ClientError::Business`] for an envelope whose code is not 200,
    /// - [`ClientError::Decode`] when the body is not an envelope of `T`,
    /// - transport errors from reqwest.
    pub async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<ApiEnvelope<T>> {
        let result = match self.execute(builder).await {
            Ok(response) => normalize(&response),
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    /// Like [`ApiClient::send`], returning only the envelope data.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`ApiClient::send`], returns [`ClientError::MissingData`]
    /// when a successful envelope has no `data`.
    pub async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let envelope = self.send::<T>(builder).await?;
        envelope.data.ok_or(ClientError::MissingData)
    }

    /// Send a request and return the raw body of a 2xx response.
    pub async fn send_raw(&self, builder: RequestBuilder) -> ClientResult<Bytes> {
        let result = match self.execute(builder).await {
            Ok(response) if response.status.is_success() => Ok(response.body),
            Ok(response) => Err(http_error(&response)),
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    async fn execute(&self, builder: RequestBuilder) -> ClientResult<RawResponse> {
        let mut request = builder.build().map_err(ClientError::Transport)?;
        for stage in self.middleware.iter() {
            stage.on_request(&mut request)?;
        }

        let method = request.method().clone();
        let url = request.url().to_string();
        let response = self
            .http
            .execute(request)
            .await
            .map_err(ClientError::from_send)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ClientError::from_send)?;

        let raw = RawResponse {
            method,
            url,
            status,
            body,
        };
        for stage in self.middleware.iter() {
            stage.on_response(&raw);
        }
        Ok(raw)
    }

    fn finish<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(error) = &result {
            for stage in self.middleware.iter() {
                stage.on_error(error);
            }
        }
        result
    }
}

fn normalize<T: DeserializeOwned>(response: &RawResponse) -> ClientResult<ApiEnvelope<T>> {
    if !response.status.is_success() {
        return Err(http_error(response));
    }

    let envelope: ApiEnvelope<T> =
        serde_json::from_slice(&response.body).map_err(ClientError::Decode)?;
    if !envelope.is_success() {
        return Err(ClientError::Business {
            code: envelope.code,
            message: envelope.message_or_default().to_string(),
        });
    }
    Ok(envelope)
}

fn http_error(response: &RawResponse) -> ClientError {
    let message = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&response.body)
        .ok()
        .map(|env| env.message_or_default().to_string())
        .unwrap_or_else(|| {
            response
                .status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        });

    ClientError::Http {
        status: response.status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use filing_core::Role;
    use mockito::{Matcher, Server};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        errors: Mutex<Vec<ErrorClass>>,
        statuses: Mutex<Vec<u16>>,
    }

    impl Middleware for Arc<Recorder> {
        fn on_response(&self, response: &RawResponse) {
            self.statuses.lock().unwrap().push(response.status.as_u16());
        }

        fn on_error(&self, error: &ClientError) {
            self.errors.lock().unwrap().push(error.class());
        }
    }

    fn client(server: &Server, session: Arc<SessionContext>) -> ApiClient {
        ApiClient::builder(server.url(), session)
            .with_default_middleware()
            .build()
            .expect("client")
    }

    #[tokio::test]
    async fn attaches_token_and_decodes_envelope() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/ping")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200,"message":"操作成功","data":"pong"}"#)
            .create_async()
            .await;

        let session = Arc::new(SessionContext::in_memory());
        session.establish("tok-1", Role::User, None, None).unwrap();
        let api = client(&server, session);

        let data: String = api.fetch(api.request(Method::GET, "/api/ping")).await.unwrap();
        assert_eq!(data, "pong");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn business_failure_is_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/thing")
            .with_status(200)
            .with_body(r#"{"code":500,"message":"模板不存在"}"#)
            .create_async()
            .await;

        let recorder = Arc::new(Recorder::default());
        let api = ApiClient::builder(server.url(), Arc::new(SessionContext::in_memory()))
            .with(recorder.clone())
            .build()
            .unwrap();

        let err = api
            .send::<serde_json::Value>(api.request(Method::POST, "/api/thing"))
            .await
            .expect_err("business error");
        match err {
            ClientError::Business { code, message } => {
                assert_eq!(code, 500);
                assert_eq!(message, "模板不存在");
            }
            other => panic!("expected Business error, got {other:?}"),
        }
        assert_eq!(*recorder.statuses.lock().unwrap(), vec![200]);
        assert_eq!(*recorder.errors.lock().unwrap(), vec![ErrorClass::Business]);
    }

    #[tokio::test]
    async fn envelope_code_401_clears_session() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/secure")
            .with_status(200)
            .with_body(r#"{"code":401,"message":"暂未登录或token已经过期"}"#)
            .create_async()
            .await;

        let session = Arc::new(SessionContext::in_memory());
        session.establish("stale", Role::Admin, None, None).unwrap();
        let api = client(&server, session.clone());

        let err = api
            .send::<serde_json::Value>(api.request(Method::GET, "/api/secure"))
            .await
            .expect_err("unauthorized");
        assert!(err.is_unauthorized());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn http_401_clears_session_and_keeps_message() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/secure")
            .with_status(401)
            .with_body(r#"{"code":401,"message":"token expired"}"#)
            .create_async()
            .await;

        let session = Arc::new(SessionContext::in_memory());
        session.establish("stale", Role::User, None, None).unwrap();
        let api = client(&server, session.clone());

        let err = api
            .send::<serde_json::Value>(api.request(Method::GET, "/api/secure"))
            .await
            .expect_err("unauthorized");
        match &err {
            ClientError::Http { status, message } => {
                assert_eq!(*status, 401);
                assert_eq!(message, "token expired");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn non_json_error_body_uses_reason_phrase() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/broken")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let api = client(&server, Arc::new(SessionContext::in_memory()));
        let err = api
            .send::<serde_json::Value>(api.request(Method::GET, "/api/broken"))
            .await
            .expect_err("server error");
        assert_eq!(err.class(), ErrorClass::Server);
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[tokio::test]
    async fn missing_data_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/empty")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code":200,"message":"ok"}"#)
            .create_async()
            .await;

        let api = client(&server, Arc::new(SessionContext::in_memory()));
        let err = api
            .fetch::<String>(api.request(Method::GET, "/api/empty"))
            .await
            .expect_err("no data");
        assert!(matches!(err, ClientError::MissingData));
    }
}
