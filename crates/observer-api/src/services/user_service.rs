//! User use cases between the controllers and the user repository.

use std::sync::Arc;

use axum::http::StatusCode;

use observer_core::logging::steps;
use observer_core::{RequestContext, User, UserRepository, UserRequest, UserView};

use crate::envelope::ResponseEnvelope;
use crate::error::{ApiError, Resource};

pub type UserEnvelope = ResponseEnvelope<UserView>;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: &UserRequest,
    ) -> Result<UserEnvelope, ApiError> {
        let step = ctx
            .base_log()?
            .start_step(steps::USER_SERVICE_CREATE_USER_PROCESSING)?;

        let user = User::from_request(request);
        let id = step.observe(self.repo.insert(ctx, &user).await)?;
        if id <= 0 {
            step.capture_message(format!("insert returned identity {id}"));
            return Err(ApiError::CreateFailed(Resource::User));
        }

        Ok(ResponseEnvelope::with_data(
            StatusCode::CREATED,
            format!("Usuário {} criado com sucesso.", request.name),
            UserView::from(User { id, ..user }),
        ))
    }

    pub async fn retrieve(&self, ctx: &RequestContext, id: i32) -> Result<UserEnvelope, ApiError> {
        let step = ctx
            .base_log()?
            .start_step(steps::USER_SERVICE_RETRIEVE_USER_PROCESSING)?;

        let user = step
            .observe(self.repo.select(ctx, id).await)?
            .ok_or(ApiError::NotFound(Resource::User))?;

        Ok(ResponseEnvelope::with_data(
            StatusCode::OK,
            "Usuário recuperado com sucesso.",
            UserView::from(user),
        ))
    }

    /// Replace the user wholesale. The returned view is built from the
    /// request, not re-read from the database.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i32,
        request: &UserRequest,
    ) -> Result<UserEnvelope, ApiError> {
        let step = ctx
            .base_log()?
            .start_step(steps::USER_SERVICE_UPDATE_USER_PROCESSING)?;

        let user = User::with_id(id, request);
        if !step.observe(self.repo.update(ctx, &user).await)? {
            return Err(ApiError::NotFound(Resource::User));
        }

        Ok(ResponseEnvelope::with_data(
            StatusCode::OK,
            format!("Dados do usuário {} foram alterados com sucesso.", request.name),
            UserView::from(user),
        ))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: i32) -> Result<UserEnvelope, ApiError> {
        let step = ctx
            .base_log()?
            .start_step(steps::USER_SERVICE_DELETE_USER_PROCESSING)?;

        if !step.observe(self.repo.delete(ctx, id).await)? {
            return Err(ApiError::NotFound(Resource::User));
        }

        Ok(ResponseEnvelope::message(
            StatusCode::OK,
            format!("Usuário {id} foi deletado com sucesso."),
        ))
    }
}
