use super::params::QueryParams;
use super::parser::parse_query_params;
use super::values::QueryValues;
use axum::{
    extract::{FromRequestParts, Request},
    http::{Extensions, request::Parts},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;

/// Parse the request's query string and attach the result for later handlers.
///
/// Use with `axum::middleware::from_fn(query_params_middleware)`. Requests
/// without recognized parameters pass through untouched.
pub async fn query_params_middleware(mut req: Request, next: Next) -> Response {
    let values = QueryValues::parse(req.uri().query().unwrap_or_default());
    if let Some(params) = parse_query_params(&values) {
        req.extensions_mut().insert(params);
    }
    next.run(req).await
}

/// Parameters attached by [`query_params_middleware`], if any.
#[must_use]
pub fn query_params(extensions: &Extensions) -> Option<&QueryParams> {
    extensions.get::<QueryParams>()
}

/// Extractor for the parsed parameters; `None` when the request had none.
///
/// ```rust,ignore
/// async fn list_habits(ListParams(params): ListParams, State(db): State<DatabaseConnection>) {
///     let query = apply_query_params(habit::Entity::find(), params.as_ref());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListParams(pub Option<QueryParams>);

impl<S: Send + Sync> FromRequestParts<S> for ListParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(query_params(&parts.extensions).cloned()))
    }
}
