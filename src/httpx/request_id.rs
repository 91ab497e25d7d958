use axum::{
    extract::FromRequestParts,
    http::{Extensions, request::Parts},
};
use std::{convert::Infallible, fmt};
use uuid::Uuid;

/// Default response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request identifier assigned by the request logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[must_use]
pub fn request_id(extensions: &Extensions) -> Option<RequestId> {
    extensions.get::<RequestId>().copied()
}

/// Extracts the request id; a fresh one outside the request logger.
impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(request_id(&parts.extensions).unwrap_or_default())
    }
}
