use super::recovery::{panic_message, render_backtrace, take_backtrace};
use super::request_id::RequestId;
use axum::{BoxError, body::Bytes, http::Method};
use http_body::{Body, Frame, SizeHint};
use std::{
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    task::{Context, Poll},
};

/// Error ending a response body whose producer panicked mid-stream.
#[derive(Debug, thiserror::Error)]
#[error("response body panicked after {bytes_written} bytes: {message}")]
pub struct BodyPanicked {
    pub message: String,
    pub bytes_written: u64,
}

/// Response body wrapper counting written bytes and containing panics.
///
/// Once the response head has been sent a panic can no longer become a 500;
/// instead it is logged and the body ends with [`BodyPanicked`].
pub struct InterceptedStream<B> {
    inner: B,
    bytes_written: u64,
    failed: bool,
    method: Method,
    path: String,
    request_id: RequestId,
}

impl<B> InterceptedStream<B> {
    pub fn new(inner: B, method: Method, path: String, request_id: RequestId) -> Self {
        Self {
            inner,
            bytes_written: 0,
            failed: false,
            method,
            path,
            request_id,
        }
    }

    /// Data bytes handed to the server so far.
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl<B> Body for InterceptedStream<B>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Into<BoxError>,
{
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = &mut *self;
        if this.failed {
            return Poll::Ready(None);
        }

        let inner = &mut this.inner;
        let polled = panic::catch_unwind(AssertUnwindSafe(|| Pin::new(inner).poll_frame(cx)));
        match polled {
            Ok(Poll::Ready(Some(Ok(frame)))) => {
                if let Some(data) = frame.data_ref() {
                    let len = u64::try_from(data.len()).unwrap_or(u64::MAX);
                    this.bytes_written = this.bytes_written.saturating_add(len);
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Ok(Poll::Ready(Some(Err(err)))) => Poll::Ready(Some(Err(axum::Error::new(err)))),
            Ok(Poll::Ready(None)) => Poll::Ready(None),
            Ok(Poll::Pending) => Poll::Pending,
            Err(payload) => {
                this.failed = true;
                let message = panic_message(payload.as_ref());
                let backtrace = render_backtrace(take_backtrace().as_ref());
                tracing::error!(
                    method = %this.method,
                    path = %this.path,
                    id = %this.request_id,
                    bytes_written = this.bytes_written,
                    error = %message,
                    backtrace = %backtrace,
                    "panic while writing http response body"
                );
                Poll::Ready(Some(Err(axum::Error::new(BodyPanicked {
                    message,
                    bytes_written: this.bytes_written,
                }))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.failed || self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
