//! Request/response middleware.
//!
//! Every call made by [`crate::ApiClient`] runs through an ordered list of [`Middleware`]:
//!
//! - `on_request` may decorate the outgoing request (headers, logging) or reject it,
//! - `on_response` observes the raw status and body before envelope normalisation,
//! - `on_error` observes the classified error of a failed call.
//!
//! Stages run in registration order. All hooks have no-op defaults so a middleware only
//! implements what it needs.

use crate::error::{ClientError, ClientResult, ErrorClass};
use bytes::Bytes;
use filing_core::SessionContext;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request, StatusCode};
use std::sync::Arc;

/// Longest body preview written to the request log, in characters.
pub const BODY_PREVIEW_CHARS: usize = 100;

/// A response as received, before normalisation.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub body: Bytes,
}

pub trait Middleware: Send + Sync {
    fn on_request(&self, _request: &mut Request) -> ClientResult<()> {
        Ok(())
    }

    fn on_response(&self, _response: &RawResponse) {}

    fn on_error(&self, _error: &ClientError) {}
}

/// Attaches `Authorization: Bearer <token>` while a session is established.
pub struct BearerAuth {
    session: Arc<SessionContext>,
}

impl BearerAuth {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self { session }
    }
}

impl Middleware for BearerAuth {
    fn on_request(&self, request: &mut Request) -> ClientResult<()> {
        if let Some(token) = self.session.token() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::InvalidInput("session token is not a valid header".into()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(())
    }
}

/// Debug-level log of each outgoing request and the status of its response.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestLog;

impl Middleware for RequestLog {
    fn on_request(&self, request: &mut Request) -> ClientResult<()> {
        tracing::debug!("request: {} {}", request.method(), request.url());
        if let Some(bytes) = request.body().and_then(|b| b.as_bytes()) {
            let content_type = request
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::debug!(
                "request body ({}): {}",
                content_type,
                body_preview(&String::from_utf8_lossy(bytes))
            );
        }
        Ok(())
    }

    fn on_response(&self, response: &RawResponse) {
        tracing::debug!(
            "response: {} {} -> {} ({} bytes)",
            response.method,
            response.url,
            response.status,
            response.body.len()
        );
    }
}

/// Truncate `body` to [`BODY_PREVIEW_CHARS`] characters, marking the cut with `...`.
pub fn body_preview(body: &str) -> String {
    if body.chars().count() > BODY_PREVIEW_CHARS {
        let cut: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        body.to_string()
    }
}

/// Clears the session when the server reports the login as missing or expired.
pub struct SessionInvalidation {
    session: Arc<SessionContext>,
}

impl SessionInvalidation {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self { session }
    }
}

impl Middleware for SessionInvalidation {
    fn on_error(&self, error: &ClientError) {
        if !error.is_unauthorized() || !self.session.is_authenticated() {
            return;
        }
        tracing::warn!("login rejected by server, clearing session");
        if let Err(e) = self.session.clear() {
            tracing::error!("failed to clear session: {}", e);
        }
    }
}

/// Logs failed calls by class.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorLog;

impl Middleware for ErrorLog {
    fn on_error(&self, error: &ClientError) {
        match error.class() {
            ErrorClass::Unauthorized => tracing::warn!("unauthorized: {}", error),
            ErrorClass::Forbidden => tracing::warn!("permission denied: {}", error),
            ErrorClass::NotFound => tracing::warn!("resource not found: {}", error),
            ErrorClass::Server => tracing::error!("server error: {}", error),
            ErrorClass::Network | ErrorClass::Timeout => {
                tracing::error!("no response from server: {}", error)
            }
            ErrorClass::BadRequest | ErrorClass::Business => tracing::error!("api error: {}", error),
            ErrorClass::Decode | ErrorClass::InvalidInput => tracing::error!("{}", error),
        }
    }
}
