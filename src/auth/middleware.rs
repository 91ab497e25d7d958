use super::config::{AuthConfig, TokenMapper};
use super::error::AuthError;
use super::verifier::TokenVerifier;
use crate::errors::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Bearer-token authentication for axum routers.
///
/// ```rust,ignore
/// let verifier = OidcVerifier::discover(OidcConfig::new(issuer)).await?;
/// let auth = Arc::new(OidcAuth::new(AuthConfig::new(Arc::new(verifier))));
///
/// let app = Router::new()
///     .route("/habits", get(list_habits))
///     .layer(middleware::from_fn_with_state(auth, require_bearer));
/// ```
pub struct OidcAuth {
    verifier: Option<Arc<dyn TokenVerifier>>,
    token_mapper: TokenMapper,
}

impl OidcAuth {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self {
            verifier: config.verifier,
            token_mapper: config.token_mapper,
        }
    }

    /// Verify the request's bearer token and store the mapped identity in its extensions.
    ///
    /// # Errors
    ///
    /// Fails when no verifier is configured, the `Authorization` header is
    /// missing or not `Bearer <token>`, the token does not verify, or the
    /// token mapper rejects it.
    pub async fn authenticate(&self, req: &mut Request) -> Result<(), AuthError> {
        let verifier = self.verifier.as_ref().ok_or(AuthError::ProviderMissing)?;

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map_err(|_| AuthError::InvalidFormat))
            .transpose()?
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingHeader)?;
        let raw_token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidFormat)?;

        let token = verifier.verify(raw_token).await?;
        (self.token_mapper)(&token, req.extensions_mut())
    }
}

/// Middleware rejecting unauthenticated requests with 401.
///
/// Use with `axum::middleware::from_fn_with_state(Arc<OidcAuth>, require_bearer)`.
/// The wrapped handler only runs after a successful verification.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for every authentication failure.
pub async fn require_bearer(
    State(auth): State<Arc<OidcAuth>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(err) = auth.authenticate(&mut req).await {
        tracing::debug!(
            error = %err,
            method = %req.method(),
            path = %req.uri().path(),
            "rejected unauthenticated request"
        );
        return Err(err.into());
    }
    Ok(next.run(req).await)
}
