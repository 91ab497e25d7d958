//! Bearer token verification against an OpenID Connect provider.

use super::config::OidcConfig;
use super::error::AuthError;
use async_trait::async_trait;
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header,
    jwk::{Jwk, JwkSet},
};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Verifies a raw bearer token and returns its identity claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AuthError::Verification`] when the token is malformed, badly
    /// signed, expired, or issued for someone else.
    async fn verify(&self, raw_token: &str) -> Result<IdToken, AuthError>;
}

/// Claims of a verified ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct IdToken {
    pub subject: String,
    pub issuer: String,
    pub audience: Vec<String>,
    /// Expiry as a Unix timestamp.
    pub expires_at: i64,
    /// Every claim, including non-standard ones such as `email` or `realm_access`.
    pub claims: Value,
}

impl IdToken {
    fn from_claims(claims: Value) -> Result<Self, AuthError> {
        let subject = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| AuthError::Verification("token has no subject".to_string()))?
            .to_string();
        let issuer = claims
            .get("iss")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let audience = match claims.get("aud") {
            Some(Value::String(aud)) => vec![aud.clone()],
            Some(Value::Array(auds)) => auds
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        let expires_at = claims.get("exp").and_then(Value::as_i64).unwrap_or_default();

        Ok(Self {
            subject,
            issuer,
            audience,
            expires_at,
            claims,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProviderMetadata {
    issuer: String,
    jwks_uri: String,
}

/// [`TokenVerifier`] backed by a provider's JSON Web Key Set.
///
/// Checks the signature, `exp` (with leeway), `iss`, and `aud` when a client id
/// is configured. When discovered from a provider, an unknown key id triggers a
/// key-set refresh to follow key rotation. Refreshes run one at a time and at
/// most once per [`OidcConfig::min_refresh_secs`].
pub struct OidcVerifier {
    config: OidcConfig,
    jwks_uri: Option<String>,
    cache: RwLock<KeyCache>,
    http: reqwest::Client,
}

struct KeyCache {
    keys: JwkSet,
    /// Last refresh caused by an unknown key id; discovery does not count.
    refreshed_at: Option<Instant>,
}

impl KeyCache {
    fn new(keys: JwkSet) -> Self {
        Self {
            keys,
            refreshed_at: None,
        }
    }
}

impl OidcVerifier {
    /// Fetch `<issuer>/.well-known/openid-configuration` and the key set it points to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Discovery`] if either document cannot be fetched or
    /// the advertised issuer differs from the configured one.
    pub async fn discover(config: OidcConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::new();
        let issuer = config.issuer_url.trim_end_matches('/');
        let metadata: ProviderMetadata =
            fetch_json(&http, &format!("{issuer}/.well-known/openid-configuration")).await?;

        if metadata.issuer.trim_end_matches('/') != issuer {
            return Err(AuthError::Discovery(format!(
                "issuer did not match the issuer returned by provider, expected {issuer:?} got {:?}",
                metadata.issuer
            )));
        }

        let keys: JwkSet = fetch_json(&http, &metadata.jwks_uri).await?;
        tracing::debug!(
            issuer = %issuer,
            jwks_uri = %metadata.jwks_uri,
            keys = keys.keys.len(),
            "discovered OIDC provider"
        );

        Ok(Self {
            config,
            jwks_uri: Some(metadata.jwks_uri),
            cache: RwLock::new(KeyCache::new(keys)),
            http,
        })
    }

    /// Verifier over a fixed key set; keys are never refreshed.
    #[must_use]
    pub fn from_jwks(config: OidcConfig, keys: JwkSet) -> Self {
        Self {
            config,
            jwks_uri: None,
            cache: RwLock::new(KeyCache::new(keys)),
            http: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(jwk) = find_key(&cache.keys, kid) {
                return Ok(DecodingKey::from_jwk(jwk)?);
            }
        }

        let (Some(kid), Some(jwks_uri)) = (kid, self.jwks_uri.as_deref()) else {
            return Err(AuthError::Verification("no matching signing key".to_string()));
        };

        // Waiters queue on the write lock and see the key set the first refresh stored.
        let mut cache = self.cache.write().await;
        if find_key(&cache.keys, Some(kid)).is_none() && self.refresh_due(cache.refreshed_at) {
            tracing::warn!(kid = %kid, jwks_uri = %jwks_uri, "unknown key id, refreshing key set");
            cache.refreshed_at = Some(Instant::now());
            match fetch_json::<JwkSet>(&self.http, jwks_uri).await {
                Ok(fresh) => cache.keys = fresh,
                Err(err) => tracing::error!(error = %err, "failed to refresh key set"),
            }
        }

        find_key(&cache.keys, Some(kid))
            .ok_or_else(|| AuthError::Verification(format!("no signing key with id {kid:?}")))
            .and_then(|jwk| DecodingKey::from_jwk(jwk).map_err(AuthError::from))
    }

    fn refresh_due(&self, refreshed_at: Option<Instant>) -> bool {
        let interval = Duration::from_secs(self.config.min_refresh_secs);
        refreshed_at.is_none_or(|at| at.elapsed() >= interval)
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.config.leeway_secs;
        validation.set_issuer(&[self.config.issuer_url.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        match &self.config.client_id {
            Some(client_id) => validation.set_audience(&[client_id.as_str()]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

#[async_trait]
impl TokenVerifier for OidcVerifier {
    async fn verify(&self, raw_token: &str) -> Result<IdToken, AuthError> {
        let header = decode_header(raw_token)?;
        if !self.config.algorithms.contains(&header.alg) {
            return Err(AuthError::Verification(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let key = self.decoding_key(header.kid.as_deref()).await?;
        let data = decode::<Value>(raw_token, &key, &self.validation(header.alg))?;
        IdToken::from_claims(data.claims)
    }
}

/// A token without `kid` may only use a key set holding exactly one key.
fn find_key<'a>(keys: &'a JwkSet, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => keys.find(kid),
        None if keys.keys.len() == 1 => keys.keys.first(),
        None => None,
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
) -> Result<T, AuthError> {
    let discovery = |err: reqwest::Error| AuthError::Discovery(format!("{url}: {err}"));
    http.get(url)
        .send()
        .await
        .map_err(discovery)?
        .error_for_status()
        .map_err(discovery)?
        .json::<T>()
        .await
        .map_err(discovery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
    use serde_json::json;

    const ISSUER: &str = "https://sso.example.com/realms/habits";
    const SECRET: &[u8] = b"httpkit-test-signing-secret-0001";

    fn key_set() -> JwkSet {
        serde_json::from_value(json!({
            "keys": [{
                "kty": "oct",
                "kid": "test-key",
                "alg": "HS256",
                "k": "aHR0cGtpdC10ZXN0LXNpZ25pbmctc2VjcmV0LTAwMDE"
            }]
        }))
        .unwrap()
    }

    fn config() -> OidcConfig {
        OidcConfig {
            algorithms: vec![Algorithm::HS256],
            ..OidcConfig::new(ISSUER)
        }
    }

    fn sign(claims: &Value, kid: Option<&str>, secret: &[u8]) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = kid.map(str::to_string);
        encode(&header, claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[allow(clippy::cast_possible_wrap)]
    fn claims(exp_offset: i64) -> Value {
        json!({
            "iss": ISSUER,
            "aud": "test",
            "sub": "user-1",
            "email": "user@example.com",
            "exp": get_current_timestamp() as i64 + exp_offset,
        })
    }

    #[tokio::test]
    async fn test_valid_token() {
        let verifier = OidcVerifier::from_jwks(config(), key_set());
        let token = sign(&claims(3600), Some("test-key"), SECRET);

        let id_token = verifier.verify(&token).await.unwrap();
        assert_eq!(id_token.subject, "user-1");
        assert_eq!(id_token.issuer, ISSUER);
        assert_eq!(id_token.audience, vec!["test".to_string()]);
        assert_eq!(id_token.claims["email"], "user@example.com");
    }

    #[tokio::test]
    async fn test_token_without_kid_uses_single_key() {
        let verifier = OidcVerifier::from_jwks(config(), key_set());
        let token = sign(&claims(3600), None, SECRET);
        assert!(verifier.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let verifier = OidcVerifier::from_jwks(config(), key_set());
        let token = sign(&claims(-3600), Some("test-key"), SECRET);
        assert!(matches!(
            verifier.verify(&token).await,
            Err(AuthError::Verification(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_signature_is_rejected() {
        let verifier = OidcVerifier::from_jwks(config(), key_set());
        let token = sign(&claims(3600), Some("test-key"), b"some-other-secret-entirely-000000");
        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_issuer_is_rejected() {
        let verifier = OidcVerifier::from_jwks(config(), key_set());
        let mut claims = claims(3600);
        claims["iss"] = json!("https://evil.example.com");
        let token = sign(&claims, Some("test-key"), SECRET);
        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_audience_checked_only_with_client_id() {
        let token = sign(&claims(3600), Some("test-key"), SECRET);

        let other = OidcVerifier::from_jwks(
            OidcConfig {
                client_id: Some("other".to_string()),
                ..config()
            },
            key_set(),
        );
        assert!(other.verify(&token).await.is_err());

        let matching = OidcVerifier::from_jwks(
            OidcConfig {
                client_id: Some("test".to_string()),
                ..config()
            },
            key_set(),
        );
        assert!(matching.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_disallowed_algorithm_is_rejected() {
        let verifier = OidcVerifier::from_jwks(OidcConfig::new(ISSUER), key_set());
        let token = sign(&claims(3600), Some("test-key"), SECRET);
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(err.to_string().contains("unexpected signing algorithm"), "{err}");
    }

    #[tokio::test]
    async fn test_unknown_kid_without_jwks_uri() {
        let verifier = OidcVerifier::from_jwks(config(), key_set());
        let token = sign(&claims(3600), Some("rotated-key"), SECRET);
        assert_eq!(
            verifier.verify(&token).await,
            Err(AuthError::Verification("no matching signing key".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_subject_is_rejected() {
        let verifier = OidcVerifier::from_jwks(config(), key_set());
        let mut claims = claims(3600);
        claims.as_object_mut().unwrap().remove("sub");
        let token = sign(&claims, Some("test-key"), SECRET);
        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let verifier = OidcVerifier::from_jwks(config(), key_set());
        assert!(matches!(
            verifier.verify("not-a-jwt").await,
            Err(AuthError::Verification(_))
        ));
    }
}
