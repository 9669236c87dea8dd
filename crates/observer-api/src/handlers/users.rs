//! User HTTP handlers.
//!
//! Every handler delegates to [`run_controller`], so each request produces one
//! request log with the controller step followed by the service and database
//! steps it reached.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;

use observer_core::logging::steps;
use observer_core::{validate_user, UserRequest};

use super::logged_body;
use crate::error::{parse_id, Resource};
use crate::pipeline::run_controller;
use crate::services::UserEnvelope;
use crate::AppState;

/// Fetch one user.
///
/// # Returns
/// - 200 OK with the user
/// - 400 Bad Request if `id` is not a positive integer
/// - 404 Not Found if no user has that id
/// - 500 Internal Server Error on database failure
pub async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> UserEnvelope {
    let ctx = state.request_context(&headers);
    let sink = state.sink.clone();
    let request = json!({ "userId": user_id });

    run_controller(
        sink.as_ref(),
        ctx,
        steps::GET_USER_BY_ID,
        &request,
        StatusCode::OK,
        |ctx| async move {
            let id = parse_id(&user_id, Resource::User)?;
            state.users.retrieve(&ctx, id).await
        },
    )
    .await
}

/// Create a user.
///
/// # Returns
/// - 201 Created with the stored user and its generated id
/// - 400 Bad Request for a malformed body or the first failed validation rule
/// - 500 Internal Server Error on database failure or missing identity
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> UserEnvelope {
    let ctx = state.request_context(&headers);
    let sink = state.sink.clone();
    let request = logged_body(&payload);

    run_controller(
        sink.as_ref(),
        ctx,
        steps::CREATE_NEW_USER,
        &request,
        StatusCode::CREATED,
        |ctx| async move {
            let Json(body) = payload?;
            validate_user(&body)?;
            state.users.create(&ctx, &body).await
        },
    )
    .await
}

/// Replace a user.
///
/// # Returns
/// - 200 OK with the new user data
/// - 400 Bad Request for an invalid id, a malformed body or a failed rule
/// - 404 Not Found if no user has that id
/// - 500 Internal Server Error on database failure
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> UserEnvelope {
    let ctx = state.request_context(&headers);
    let sink = state.sink.clone();
    let request = json!({ "userId": user_id, "body": logged_body(&payload) });

    run_controller(
        sink.as_ref(),
        ctx,
        steps::EDIT_USER_BY_ID,
        &request,
        StatusCode::OK,
        |ctx| async move {
            let id = parse_id(&user_id, Resource::User)?;
            let Json(body) = payload?;
            validate_user(&body)?;
            state.users.update(&ctx, id, &body).await
        },
    )
    .await
}

/// Delete a user.
///
/// # Returns
/// - 200 OK without data
/// - 400 Bad Request if `id` is not a positive integer
/// - 404 Not Found if no user has that id
/// - 500 Internal Server Error on database failure
pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> UserEnvelope {
    let ctx = state.request_context(&headers);
    let sink = state.sink.clone();
    let request = json!({ "userId": user_id });

    run_controller(
        sink.as_ref(),
        ctx,
        steps::DELETE_USER_BY_ID,
        &request,
        StatusCode::OK,
        |ctx| async move {
            let id = parse_id(&user_id, Resource::User)?;
            state.users.delete(&ctx, id).await
        },
    )
    .await
}
