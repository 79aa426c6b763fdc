//! # Filing Client
//!
//! Typed HTTP client for the filing REST API.
//!
//! A single [`ApiClient`] carries the base URL, timeout and middleware pipeline; the endpoint
//! groups in [`api`] borrow it:
//!
//! ```no_run
//! # async fn run(client: filing_client::ApiClient) -> filing_client::ClientResult<()> {
//! let page = client.user_templates().page(&Default::default()).await?;
//! for item in page.content {
//!     println!("{} {}", item.id, item.status_label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod middleware;

pub use client::{ApiClient, ApiClientBuilder};
pub use error::{ClientError, ClientResult, ErrorClass};
pub use middleware::{BearerAuth, ErrorLog, Middleware, RawResponse, RequestLog, SessionInvalidation};
