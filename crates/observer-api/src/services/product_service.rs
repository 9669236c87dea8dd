//! Product use cases between the controllers and the product repository.

use std::sync::Arc;

use axum::http::StatusCode;

use observer_core::logging::steps;
use observer_core::{Product, ProductRepository, ProductRequest, ProductView, RequestContext};

use crate::envelope::ResponseEnvelope;
use crate::error::{ApiError, Resource};

pub type ProductEnvelope = ResponseEnvelope<ProductView>;

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: &ProductRequest,
    ) -> Result<ProductEnvelope, ApiError> {
        let step = ctx
            .base_log()?
            .start_step(steps::PRODUCT_SERVICE_CREATE_PRODUCT_PROCESSING)?;

        let product = Product::from_request(request);
        let id = step.observe(self.repo.insert(ctx, &product).await)?;
        if id <= 0 {
            step.capture_message(format!("insert returned identity {id}"));
            return Err(ApiError::CreateFailed(Resource::Product));
        }

        Ok(ResponseEnvelope::with_data(
            StatusCode::CREATED,
            format!("Produto {} criado com sucesso.", request.name),
            ProductView::from(Product { id, ..product }),
        ))
    }

    pub async fn retrieve(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<ProductEnvelope, ApiError> {
        let step = ctx
            .base_log()?
            .start_step(steps::PRODUCT_SERVICE_RETRIEVE_PRODUCT_PROCESSING)?;

        let product = step
            .observe(self.repo.select(ctx, id).await)?
            .ok_or(ApiError::NotFound(Resource::Product))?;

        Ok(ResponseEnvelope::with_data(
            StatusCode::OK,
            "Produto recuperado com sucesso.",
            ProductView::from(product),
        ))
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i32,
        request: &ProductRequest,
    ) -> Result<ProductEnvelope, ApiError> {
        let step = ctx
            .base_log()?
            .start_step(steps::PRODUCT_SERVICE_UPDATE_PRODUCT_PROCESSING)?;

        let product = Product::with_id(id, request);
        if !step.observe(self.repo.update(ctx, &product).await)? {
            return Err(ApiError::NotFound(Resource::Product));
        }

        Ok(ResponseEnvelope::with_data(
            StatusCode::OK,
            format!("Dados do produto {} foram alterados com sucesso.", request.name),
            ProductView::from(product),
        ))
    }

    pub async fn delete(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<ProductEnvelope, ApiError> {
        let step = ctx
            .base_log()?
            .start_step(steps::PRODUCT_SERVICE_DELETE_PRODUCT_PROCESSING)?;

        if !step.observe(self.repo.delete(ctx, id).await)? {
            return Err(ApiError::NotFound(Resource::Product));
        }

        Ok(ResponseEnvelope::message(
            StatusCode::OK,
            format!("Produto {id} foi deletado com sucesso."),
        ))
    }
}
