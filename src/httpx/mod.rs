//! # Request Logging & Recovery
//!
//! [`log_requests`] gives every request a UUID v4 [`RequestId`], logs its
//! start and end through `tracing`, and keeps handler panics from taking the
//! connection down: they are handed to a [`PanicHandler`] that builds the
//! response, by default a logged 500.

pub mod interceptor;
pub mod logger;
pub mod recovery;
pub mod request_id;

pub use interceptor::{BodyPanicked, InterceptedStream};
pub use logger::{LoggerConfig, RequestLogger, log_requests};
pub use recovery::{PanicHandler, PanicReport, default_panic_handler, install_panic_hook};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id};
