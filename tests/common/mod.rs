#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    http::{Request, Response},
    routing::get,
};
use httpkit::{
    ApiError, CurrentUser, ListParams, RequestId,
    auth::{AuthConfig, OidcAuth, OidcConfig, OidcVerifier, require_bearer},
    httpx::{LoggerConfig, RequestLogger, log_requests},
    query::{QueryParams, query_params_middleware},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp, jwk::JwkSet};
use serde_json::{Value, json};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub mod habit_entity;

pub const KEY_ID: &str = "test-key";
pub const SECRET: &[u8] = b"httpkit-test-signing-secret-0001";
pub const ROTATED_KEY_ID: &str = "rotated-key";
pub const ROTATED_SECRET: &[u8] = b"httpkit-test-rotated-secret-0002";

/// Send test logs through the libtest capture.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn oct_key(kid: &str, k: &str) -> Value {
    json!({"kty": "oct", "kid": kid, "alg": "HS256", "k": k})
}

pub fn signing_keys() -> JwkSet {
    serde_json::from_value(json!({
        "keys": [oct_key(KEY_ID, "aHR0cGtpdC10ZXN0LXNpZ25pbmctc2VjcmV0LTAwMDE")]
    }))
    .unwrap()
}

/// The original key plus `rotated-key`, as served after a key rotation.
pub fn rotated_signing_keys() -> JwkSet {
    let mut keys = signing_keys();
    keys.keys.push(
        serde_json::from_value(oct_key(
            ROTATED_KEY_ID,
            "aHR0cGtpdC10ZXN0LXJvdGF0ZWQtc2VjcmV0LTAwMDI",
        ))
        .unwrap(),
    );
    keys
}

pub fn oidc_config(issuer: &str) -> OidcConfig {
    OidcConfig {
        algorithms: vec![Algorithm::HS256],
        ..OidcConfig::new(issuer)
    }
}

pub fn sign_token(issuer: &str, subject: &str) -> String {
    sign_token_with_key(issuer, subject, KEY_ID, SECRET)
}

#[allow(clippy::cast_possible_wrap)]
pub fn sign_token_with_key(issuer: &str, subject: &str, kid: &str, secret: &[u8]) -> String {
    let claims = json!({
        "iss": issuer,
        "aud": "habits",
        "sub": subject,
        "exp": get_current_timestamp() as i64 + 3600,
    });
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(kid.to_string());
    encode(&header, &claims, &EncodingKey::from_secret(secret)).unwrap()
}

/// In-process OIDC provider serving discovery and JWKS documents.
pub struct TestProvider {
    pub issuer: String,
    keys: Arc<Mutex<JwkSet>>,
    jwks_fetches: Arc<AtomicUsize>,
}

impl TestProvider {
    /// Replace the key set served from now on.
    pub fn rotate_keys(&self, keys: JwkSet) {
        *self.keys.lock().unwrap() = keys;
    }

    /// Key-set downloads so far, discovery included.
    pub fn jwks_fetches(&self) -> usize {
        self.jwks_fetches.load(Ordering::SeqCst)
    }
}

/// Serve a provider on an ephemeral port.
pub async fn spawn_oidc_provider() -> TestProvider {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let issuer = format!("http://{}", listener.local_addr().unwrap());

    let discovery = json!({
        "issuer": issuer,
        "jwks_uri": format!("{issuer}/protocol/openid-connect/certs"),
    });
    let keys = Arc::new(Mutex::new(signing_keys()));
    let jwks_fetches = Arc::new(AtomicUsize::new(0));

    let served_keys = Arc::clone(&keys);
    let fetches = Arc::clone(&jwks_fetches);
    let app = Router::new()
        .route(
            "/.well-known/openid-configuration",
            get(move || async move { Json(discovery) }),
        )
        .route(
            "/protocol/openid-connect/certs",
            get(move || {
                fetches.fetch_add(1, Ordering::SeqCst);
                let keys = served_keys.lock().unwrap().clone();
                async move { Json(keys) }
            }),
        );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestProvider {
        issuer,
        keys,
        jwks_fetches,
    }
}

async fn echo_params(ListParams(params): ListParams) -> Json<Option<QueryParams>> {
    Json(params)
}

async fn whoami(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({ "user_id": user }))
}

async fn request_id(id: RequestId) -> String {
    id.to_string()
}

async fn explode() -> &'static str {
    panic!("handler exploded");
}

async fn fail() -> Result<(), ApiError> {
    Err(ApiError::unauthorized("nope"))
}

pub fn setup_query_app() -> Router {
    Router::new()
        .route("/habits", get(echo_params))
        .layer(axum::middleware::from_fn(query_params_middleware))
}

pub fn setup_auth_app(auth: OidcAuth) -> Router {
    Router::new()
        .route("/me", get(whoami))
        .layer(axum::middleware::from_fn_with_state(
            Arc::new(auth),
            require_bearer,
        ))
}

pub async fn setup_discovered_auth_app() -> (Router, TestProvider) {
    let provider = spawn_oidc_provider().await;
    let verifier = OidcVerifier::discover(oidc_config(&provider.issuer))
        .await
        .unwrap();
    let auth = OidcAuth::new(AuthConfig::new(Arc::new(verifier)));
    (setup_auth_app(auth), provider)
}

pub fn setup_logged_app(config: LoggerConfig) -> Router {
    init_tracing();
    Router::new()
        .route("/request-id", get(request_id))
        .route("/explode", get(explode))
        .route("/fail", get(fail))
        .layer(axum::middleware::from_fn_with_state(
            Arc::new(RequestLogger::new(config)),
            log_requests,
        ))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get_request(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
