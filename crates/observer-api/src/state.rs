//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tokio_util::sync::CancellationToken;

use observer_core::{LogSink, ProductRepository, RequestContext, UserRepository};

use crate::services::{ProductService, UserService};

/// Header carrying the correlation id set by `SetRequestIdLayer`.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub products: ProductService,
    pub sink: Arc<dyn LogSink>,
    /// Cancelled on graceful shutdown; every request token is a child of it.
    pub shutdown: CancellationToken,
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            users: UserService::new(users),
            products: ProductService::new(products),
            sink,
            shutdown: CancellationToken::new(),
            request_timeout: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the context for one request, reusing the inbound request id.
    pub fn request_context(&self, headers: &HeaderMap) -> RequestContext {
        let ctx = match headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        {
            Some(id) => RequestContext::new(id),
            None => RequestContext::generate(),
        };

        let ctx = ctx.with_cancellation(self.shutdown.child_token());
        match self.request_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}
