//! Request-scoped context passed explicitly through every layer.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::request_log::{BaseLog, RequestLog};

/// Everything an inner layer needs to know about the request it serves.
///
/// The controller creates one per request; services and repositories receive
/// it as `&RequestContext`. Clones share the same log and cancellation token.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    log: RequestLog,
    cancel: CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl RequestContext {
    /// Create the context and its request log.
    pub fn new(request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        Self {
            log: RequestLog::create(request_id.clone()),
            request_id,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Use `token` instead of a standalone token, typically a child of the
    /// server shutdown token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Fail database calls that are still pending `timeout` from now.
    ///
    /// The deadline covers the whole request, not each call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some((Instant::now() + timeout, timeout));
        self
    }

    /// Create a context with a fresh UUIDv7 request id.
    pub fn generate() -> Self {
        Self::new(Uuid::now_v7().to_string())
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The log bound to this request.
    ///
    /// Fails with [`Error::NoActiveRequestContext`] once the log has been
    /// finalized.
    pub fn base_log(&self) -> Result<&RequestLog> {
        if self.log.is_active() {
            Ok(&self.log)
        } else {
            Err(Error::NoActiveRequestContext)
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run `fut` unless the request is cancelled or its deadline passes first.
    pub async fn cancellable<T, E, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: Into<Error>,
    {
        let work = async { fut.await.map_err(Into::into) };

        match self.deadline {
            Some((at, timeout)) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(Error::Cancelled),
                    _ = tokio::time::sleep_until(at) => Err(Error::Timeout(timeout)),
                    result = work => result,
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(Error::Cancelled),
                    result = work => result,
                }
            }
        }
    }

    /// Finalize the request log and hand it over for the sink write.
    pub fn finish(&self) -> Result<BaseLog> {
        self.log.finish()
    }
}
