//! # OIDC Bearer Authentication
//!
//! Requests must carry `Authorization: Bearer <token>`. The token is handed to a
//! [`TokenVerifier`]; signature, expiry and claim checks are entirely its job.
//! On success a [`TokenMapper`] copies identity into the request extensions,
//! by default the `sub` claim as [`UserId`](crate::context::UserId).
//!
//! Every failure ends the request with 401 before the wrapped handler runs.

pub mod config;
pub mod error;
pub mod middleware;
pub mod verifier;

pub use config::{AuthConfig, OidcConfig, TokenMapper, default_token_mapper};
pub use error::AuthError;
pub use middleware::{OidcAuth, require_bearer};
pub use verifier::{IdToken, OidcVerifier, TokenVerifier};
