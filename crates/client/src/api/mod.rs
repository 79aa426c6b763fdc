//! Endpoint groups of the REST API.
//!
//! Each group is a thin borrow of [`ApiClient`]: it builds the request and picks the right
//! send method; transport, auth and error handling live in the client and its middleware.

pub mod auth;
pub mod files;
pub mod filings;
pub mod templates;
pub mod user_templates;
pub mod users;

pub use auth::AuthApi;
pub use files::FilesApi;
pub use filings::FilingsApi;
pub use templates::TemplatesApi;
pub use user_templates::UserTemplatesApi;
pub use users::UsersApi;

use crate::client::ApiClient;
use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn templates(&self) -> TemplatesApi<'_> {
        TemplatesApi::new(self)
    }

    pub fn user_templates(&self) -> UserTemplatesApi<'_> {
        UserTemplatesApi::new(self)
    }

    pub fn filings(&self) -> FilingsApi<'_> {
        FilingsApi::new(self)
    }

    pub fn files(&self) -> FilesApi<'_> {
        FilesApi::new(self)
    }
}

/// Attach a free-text remark as a `text/plain` body, if there is one.
pub(crate) fn with_remarks(builder: RequestBuilder, remarks: Option<&str>) -> RequestBuilder {
    match remarks {
        Some(text) => builder
            .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(text.to_string()),
        None => builder,
    }
}
