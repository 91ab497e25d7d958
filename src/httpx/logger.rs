use super::interceptor::InterceptedStream;
use super::recovery::{
    PanicHandler, PanicReport, default_panic_handler, install_panic_hook, panic_message,
    take_backtrace,
};
use super::request_id::{REQUEST_ID_HEADER, RequestId};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use futures::FutureExt;
use std::{panic::AssertUnwindSafe, sync::Arc, time::Instant};
use tracing::Instrument;

/// Request logger configuration.
#[derive(Clone, Default)]
pub struct LoggerConfig {
    /// Turns a handler panic into a response. `None` logs the panic and answers 500.
    pub panic_handler: Option<PanicHandler>,
    /// Response header echoing the generated request id. `None` means `x-request-id`.
    pub request_id_header: Option<HeaderName>,
}

/// Shared state for [`log_requests`].
///
/// ```rust,ignore
/// let logger = Arc::new(RequestLogger::new(LoggerConfig::default()));
/// let app = Router::new()
///     .route("/habits", get(list_habits))
///     .layer(middleware::from_fn_with_state(logger, log_requests));
/// ```
pub struct RequestLogger {
    panic_handler: PanicHandler,
    request_id_header: HeaderName,
}

impl RequestLogger {
    /// Installs the backtrace-recording panic hook on first use.
    #[must_use]
    pub fn new(config: LoggerConfig) -> Self {
        install_panic_hook();
        Self {
            panic_handler: config
                .panic_handler
                .unwrap_or_else(|| Arc::new(default_panic_handler)),
            request_id_header: config
                .request_id_header
                .unwrap_or_else(|| HeaderName::from_static(REQUEST_ID_HEADER)),
        }
    }

    pub const fn request_id_header(&self) -> &HeaderName {
        &self.request_id_header
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

/// Middleware assigning a request id, logging each request and recovering from panics.
///
/// Handler panics go to the configured [`PanicHandler`]; panics while the
/// response body streams are contained by [`InterceptedStream`].
pub async fn log_requests(
    State(logger): State<Arc<RequestLogger>>,
    mut req: Request,
    next: Next,
) -> Response {
    let id = RequestId::new();
    req.extensions_mut().insert(id);
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    tracing::info!(%method, %path, %id, "handling http request");

    let span = tracing::info_span!("http_request", %id);
    let outcome = AssertUnwindSafe(next.run(req))
        .catch_unwind()
        .instrument(span)
        .await;

    let mut response = match outcome {
        Ok(response) => response,
        Err(payload) => (logger.panic_handler)(PanicReport {
            method: method.clone(),
            path: path.clone(),
            request_id: id,
            message: panic_message(payload.as_ref()),
            backtrace: take_backtrace(),
        }),
    };

    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response
            .headers_mut()
            .insert(logger.request_id_header.clone(), value);
    }

    tracing::info!(
        %method,
        %path,
        elapsed = ?started.elapsed(),
        status = response.status().as_u16(),
        %id,
        "handled http request"
    );

    let (parts, body) = response.into_parts();
    let body = Body::new(InterceptedStream::new(body, method, path, id));
    Response::from_parts(parts, body)
}
