//! User repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;

use observer_core::logging::steps;
use observer_core::{RequestContext, Result, User, UserRepository};

use crate::pool::acquire;

const SELECT_USER: &str = r#"
    SELECT id, name, last_name, birthdate, document, login, password, created_at, updated_at
    FROM users
    WHERE id = $1
"#;

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn insert_row(&self, ctx: &RequestContext, user: &User) -> Result<i32> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let id = ctx
            .cancellable(
                sqlx::query_scalar::<_, i32>(
                    r#"
                    INSERT INTO users (name, last_name, birthdate, document, login, password, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING id
                    "#,
                )
                .bind(&user.name)
                .bind(&user.last_name)
                .bind(user.birthdate)
                .bind(&user.document)
                .bind(&user.login)
                .bind(&user.password)
                .bind(user.created_at)
                .bind(user.updated_at)
                .fetch_one(&mut *conn),
            )
            .await?;

        debug!(
            subsystem = "database",
            component = "users",
            op = "insert",
            request_id = ctx.request_id(),
            user_id = id,
            "User inserted"
        );
        Ok(id)
    }

    async fn select_row(&self, ctx: &RequestContext, id: i32) -> Result<Option<User>> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let user = ctx
            .cancellable(
                sqlx::query_as::<_, User>(SELECT_USER)
                    .bind(id)
                    .fetch_optional(&mut *conn),
            )
            .await?;

        debug!(
            subsystem = "database",
            component = "users",
            op = "select",
            request_id = ctx.request_id(),
            user_id = id,
            found = user.is_some(),
            "User lookup"
        );
        Ok(user)
    }

    async fn update_row(&self, ctx: &RequestContext, user: &User) -> Result<bool> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let result = ctx
            .cancellable(
                sqlx::query(
                    r#"
                    UPDATE users
                    SET name = $2, last_name = $3, birthdate = $4, document = $5,
                        login = $6, password = $7, updated_at = $8
                    WHERE id = $1
                    "#,
                )
                .bind(user.id)
                .bind(&user.name)
                .bind(&user.last_name)
                .bind(user.birthdate)
                .bind(&user.document)
                .bind(&user.login)
                .bind(&user.password)
                .bind(user.updated_at)
                .execute(&mut *conn),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_row(&self, ctx: &RequestContext, id: i32) -> Result<bool> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let result = ctx
            .cancellable(
                sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id)
                    .execute(&mut *conn),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, ctx: &RequestContext, user: &User) -> Result<i32> {
        let step = ctx
            .base_log()?
            .start_step(steps::USER_DATABASE_CREATE_DATA)?;
        step.observe(self.insert_row(ctx, user).await)
    }

    async fn select(&self, ctx: &RequestContext, id: i32) -> Result<Option<User>> {
        let step = ctx
            .base_log()?
            .start_step(steps::USER_DATABASE_RETRIEVE_DATA)?;
        step.observe(self.select_row(ctx, id).await)
    }

    async fn update(&self, ctx: &RequestContext, user: &User) -> Result<bool> {
        let step = ctx
            .base_log()?
            .start_step(steps::USER_DATABASE_UPDATE_DATA)?;
        step.observe(self.update_row(ctx, user).await)
    }

    async fn delete(&self, ctx: &RequestContext, id: i32) -> Result<bool> {
        let step = ctx
            .base_log()?
            .start_step(steps::USER_DATABASE_DELETE_DATA)?;
        step.observe(self.delete_row(ctx, id).await)
    }
}
