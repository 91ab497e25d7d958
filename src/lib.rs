//! HTTP plumbing for axum services backed by sea-orm.
//!
//! - [`query`]: `filter`/`sort`/`limit`/`offset`/`page` parsing and application to selects
//! - [`auth`]: OIDC bearer-token middleware
//! - [`httpx`]: request ids, request logging and panic recovery
//! - [`context`]: the authenticated user id carried in request extensions
//! - [`pagination`]: list response envelope and `Content-Range`

pub mod auth;
pub mod context;
pub mod errors;
pub mod httpx;
pub mod models;
pub mod pagination;
pub mod query;

pub use auth::{AuthConfig, OidcAuth, OidcConfig, OidcVerifier, require_bearer};
pub use context::{CurrentUser, UserId};
pub use errors::ApiError;
pub use httpx::{LoggerConfig, RequestId, RequestLogger, log_requests};
pub use models::ListQuery;
pub use pagination::{Page, content_range};
pub use query::{ListParams, QueryParams, apply_query_params, query_params_middleware};
