//! Product HTTP handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;

use observer_core::logging::steps;
use observer_core::{validate_product, ProductRequest};

use super::logged_body;
use crate::error::{parse_id, Resource};
use crate::pipeline::run_controller;
use crate::services::ProductEnvelope;
use crate::AppState;

/// Fetch one product. 200, 400 (invalid id), 404 or 500.
pub async fn get_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> ProductEnvelope {
    let ctx = state.request_context(&headers);
    let sink = state.sink.clone();
    let request = json!({ "productId": product_id });

    run_controller(
        sink.as_ref(),
        ctx,
        steps::GET_PRODUCT_BY_ID,
        &request,
        StatusCode::OK,
        |ctx| async move {
            let id = parse_id(&product_id, Resource::Product)?;
            state.products.retrieve(&ctx, id).await
        },
    )
    .await
}

/// Create a product. 201, 400 (body or validation) or 500.
pub async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> ProductEnvelope {
    let ctx = state.request_context(&headers);
    let sink = state.sink.clone();
    let request = logged_body(&payload);

    run_controller(
        sink.as_ref(),
        ctx,
        steps::CREATE_NEW_PRODUCT,
        &request,
        StatusCode::CREATED,
        |ctx| async move {
            let Json(body) = payload?;
            validate_product(&body)?;
            state.products.create(&ctx, &body).await
        },
    )
    .await
}

/// Replace a product. 200, 400, 404 or 500.
pub async fn update_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> ProductEnvelope {
    let ctx = state.request_context(&headers);
    let sink = state.sink.clone();
    let request = json!({ "productId": product_id, "body": logged_body(&payload) });

    run_controller(
        sink.as_ref(),
        ctx,
        steps::EDIT_PRODUCT_BY_ID,
        &request,
        StatusCode::OK,
        |ctx| async move {
            let id = parse_id(&product_id, Resource::Product)?;
            let Json(body) = payload?;
            validate_product(&body)?;
            state.products.update(&ctx, id, &body).await
        },
    )
    .await
}

/// Delete a product. 200, 400, 404 or 500.
pub async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> ProductEnvelope {
    let ctx = state.request_context(&headers);
    let sink = state.sink.clone();
    let request = json!({ "productId": product_id });

    run_controller(
        sink.as_ref(),
        ctx,
        steps::DELETE_PRODUCT_BY_ID,
        &request,
        StatusCode::OK,
        |ctx| async move {
            let id = parse_id(&product_id, Resource::Product)?;
            state.products.delete(&ctx, id).await
        },
    )
    .await
}
