//! # observer-api
//!
//! HTTP API for users and products with per-request step logging.
//!
//! Every user and product request runs through
//! [`pipeline::run_controller`]: the controller, service and repository each
//! register a timed step on the request's log, and the finished log is written
//! once to the configured [`LogSink`](observer_core::LogSink).

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod services;
pub mod state;
pub mod telemetry;

use axum::{routing::get, Router};
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

pub use envelope::ResponseEnvelope;
pub use error::{ApiError, Resource};
pub use state::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// The same id becomes the request log's `requestId`.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let users = Router::new()
        .route("/", axum::routing::post(handlers::create_user))
        .route(
            "/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        );

    let products = Router::new()
        .route("/", axum::routing::post(handlers::create_product))
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/users", users)
        .nest("/products", products)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .with_state(state)
}
