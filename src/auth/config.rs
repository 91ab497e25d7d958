use super::error::AuthError;
use super::verifier::{IdToken, TokenVerifier};
use crate::context::with_user_id;
use axum::http::Extensions;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::sync::Arc;

/// Provider settings for [`OidcVerifier`](super::OidcVerifier).
///
/// Deserializable so it can sit in an application's config file:
///
/// ```toml
/// [oidc]
/// issuer_url = "https://sso.example.com/realms/habits"
/// client_id = "habits-api"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OidcConfig {
    /// Issuer URL; must match the `iss` claim and the discovery document exactly.
    pub issuer_url: String,
    /// Expected `aud` claim. `None` skips the audience check.
    pub client_id: Option<String>,
    /// Accepted signing algorithms.
    pub algorithms: Vec<Algorithm>,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
    /// Minimum seconds between key-set refreshes triggered by unknown key ids.
    pub min_refresh_secs: u64,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            issuer_url: String::new(),
            client_id: None,
            algorithms: vec![Algorithm::RS256],
            leeway_secs: 60,
            min_refresh_secs: 60,
        }
    }
}

impl OidcConfig {
    pub fn new(issuer_url: impl Into<String>) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            ..Self::default()
        }
    }
}

/// Stores identity from a verified token into the request extensions.
pub type TokenMapper =
    Arc<dyn Fn(&IdToken, &mut Extensions) -> Result<(), AuthError> + Send + Sync>;

/// Stores the token subject verbatim as the [`UserId`](crate::context::UserId).
///
/// # Errors
///
/// Never fails; the signature matches [`TokenMapper`].
pub fn default_token_mapper(token: &IdToken, extensions: &mut Extensions) -> Result<(), AuthError> {
    with_user_id(extensions, token.subject.clone());
    Ok(())
}

/// Settings for [`OidcAuth`](super::OidcAuth).
#[derive(Clone)]
pub struct AuthConfig {
    /// Token verifier. Without one every request is rejected.
    pub verifier: Option<Arc<dyn TokenVerifier>>,
    pub token_mapper: TokenMapper,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verifier: None,
            token_mapper: Arc::new(default_token_mapper),
        }
    }
}

impl AuthConfig {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            verifier: Some(verifier),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oidc_config_defaults() {
        let config: OidcConfig =
            serde_json::from_str(r#"{"issuer_url": "https://sso.example.com"}"#).unwrap();
        assert_eq!(config.issuer_url, "https://sso.example.com");
        assert_eq!(config.client_id, None);
        assert_eq!(config.algorithms, vec![Algorithm::RS256]);
        assert_eq!(config.leeway_secs, 60);
        assert_eq!(config.min_refresh_secs, 60);
    }

    #[test]
    fn test_oidc_config_overrides() {
        let config: OidcConfig = serde_json::from_str(
            r#"{"issuer_url": "https://sso", "client_id": "api", "algorithms": ["ES256"], "leeway_secs": 0, "min_refresh_secs": 5}"#,
        )
        .unwrap();
        assert_eq!(config.client_id.as_deref(), Some("api"));
        assert_eq!(config.algorithms, vec![Algorithm::ES256]);
        assert_eq!(config.leeway_secs, 0);
        assert_eq!(config.min_refresh_secs, 5);
    }

    #[test]
    fn test_default_mapper_stores_subject() {
        let token = IdToken {
            subject: "user-1".to_string(),
            issuer: "https://sso".to_string(),
            audience: vec![],
            expires_at: 0,
            claims: serde_json::Value::Null,
        };
        let mut extensions = Extensions::new();
        default_token_mapper(&token, &mut extensions).unwrap();
        assert_eq!(
            crate::context::user_id(&extensions).map(|id| id.as_str()),
            Some("user-1")
        );
    }
}
