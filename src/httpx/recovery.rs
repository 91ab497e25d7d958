use crate::errors::ApiError;
use axum::{
    http::Method,
    response::{IntoResponse, Response},
};
use std::{
    any::Any,
    backtrace::Backtrace,
    cell::RefCell,
    fmt,
    panic,
    sync::{Arc, Once},
};

use super::request_id::RequestId;

/// Converts a caught panic into the response sent to the client.
pub type PanicHandler = Arc<dyn Fn(PanicReport) -> Response + Send + Sync>;

/// Everything known about a request whose handler panicked.
pub struct PanicReport {
    pub method: Method,
    pub path: String,
    pub request_id: RequestId,
    /// Panic payload when it was a string, `"unknown panic"` otherwise.
    pub message: String,
    /// Captured at the panic site by the hook from [`install_panic_hook`].
    pub backtrace: Option<Backtrace>,
}

impl fmt::Debug for PanicReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanicReport")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("request_id", &self.request_id)
            .field("message", &self.message)
            .field("has_backtrace", &self.backtrace.is_some())
            .finish()
    }
}

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Install a process-wide panic hook recording the backtrace of the panicking
/// thread. The previous hook still runs afterwards. Idempotent.
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(Backtrace::force_capture()));
            previous(info);
        }));
    });
}

/// Backtrace of the most recent panic on this thread, if the hook saw one.
pub fn take_backtrace() -> Option<Backtrace> {
    LAST_BACKTRACE.with(|slot| slot.borrow_mut().take())
}

/// Human readable panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

pub(crate) fn render_backtrace(backtrace: Option<&Backtrace>) -> String {
    backtrace.map_or_else(|| "unavailable".to_string(), ToString::to_string)
}

/// Logs the panic with its backtrace and answers with a bare 500.
#[allow(clippy::needless_pass_by_value)]
pub fn default_panic_handler(report: PanicReport) -> Response {
    let backtrace = render_backtrace(report.backtrace.as_ref());
    tracing::error!(
        method = %report.method,
        path = %report.path,
        id = %report.request_id,
        error = %report.message,
        backtrace = %backtrace,
        "panic while handling http request"
    );
    ApiError::internal("Internal Server Error", None).into_response()
}
