//! Request-scoped user identity.
//!
//! Values live in the request's [`Extensions`], keyed by type, so the user id
//! and the parsed [`QueryParams`](crate::query::QueryParams) can never be read
//! back as each other. Both are dropped with the request.

use crate::errors::ApiError;
use axum::{
    extract::FromRequestParts,
    http::{Extensions, request::Parts},
};
use serde::Serialize;
use std::fmt;

/// Identifier of the authenticated caller, usually the token subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn with_user_id(extensions: &mut Extensions, id: impl Into<String>) {
    extensions.insert(UserId::new(id));
}

#[must_use]
pub fn user_id(extensions: &Extensions) -> Option<&UserId> {
    extensions.get::<UserId>()
}

/// Look up the user id where the auth middleware guarantees one.
///
/// # Errors
///
/// Returns an internal error when no id was stored, which means the route is
/// not behind [`require_bearer`](crate::auth::require_bearer).
pub fn require_user_id(extensions: &Extensions) -> Result<&UserId, ApiError> {
    user_id(extensions).ok_or_else(|| {
        ApiError::internal(
            "Internal Server Error",
            Some("user id missing from request context".to_string()),
        )
    })
}

/// Extractor for handlers behind the auth middleware.
///
/// Rejects with a 500 when the identity is missing.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_user_id(&parts.extensions).cloned().map(Self)
    }
}
