//! Product repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;

use observer_core::logging::steps;
use observer_core::{Product, ProductRepository, RequestContext, Result};

use crate::pool::acquire;

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, category, description, stock, production_batch_date, created_at, updated_at
    FROM products
    WHERE id = $1
"#;

/// PostgreSQL implementation of ProductRepository.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: Pool<Postgres>,
}

impl PgProductRepository {
    /// Create a new PgProductRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn insert_row(&self, ctx: &RequestContext, product: &Product) -> Result<i32> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let id = ctx
            .cancellable(
                sqlx::query_scalar::<_, i32>(
                    r#"
                    INSERT INTO products (name, category, description, stock, production_batch_date, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING id
                    "#,
                )
                .bind(&product.name)
                .bind(&product.category)
                .bind(&product.description)
                .bind(product.stock)
                .bind(product.production_batch_date)
                .bind(product.created_at)
                .bind(product.updated_at)
                .fetch_one(&mut *conn),
            )
            .await?;

        debug!(
            subsystem = "database",
            component = "products",
            op = "insert",
            request_id = ctx.request_id(),
            product_id = id,
            "Product inserted"
        );
        Ok(id)
    }

    async fn select_row(&self, ctx: &RequestContext, id: i32) -> Result<Option<Product>> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let product = ctx
            .cancellable(
                sqlx::query_as::<_, Product>(SELECT_PRODUCT)
                    .bind(id)
                    .fetch_optional(&mut *conn),
            )
            .await?;

        debug!(
            subsystem = "database",
            component = "products",
            op = "select",
            request_id = ctx.request_id(),
            product_id = id,
            found = product.is_some(),
            "Product lookup"
        );
        Ok(product)
    }

    async fn update_row(&self, ctx: &RequestContext, product: &Product) -> Result<bool> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let result = ctx
            .cancellable(
                sqlx::query(
                    r#"
                    UPDATE products
                    SET name = $2, category = $3, description = $4, stock = $5,
                        production_batch_date = $6, updated_at = $7
                    WHERE id = $1
                    "#,
                )
                .bind(product.id)
                .bind(&product.name)
                .bind(&product.category)
                .bind(&product.description)
                .bind(product.stock)
                .bind(product.production_batch_date)
                .bind(product.updated_at)
                .execute(&mut *conn),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_row(&self, ctx: &RequestContext, id: i32) -> Result<bool> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let result = ctx
            .cancellable(
                sqlx::query("DELETE FROM products WHERE id = $1")
                    .bind(id)
                    .execute(&mut *conn),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn insert(&self, ctx: &RequestContext, product: &Product) -> Result<i32> {
        let step = ctx
            .base_log()?
            .start_step(steps::PRODUCT_DATABASE_CREATE_DATA)?;
        step.observe(self.insert_row(ctx, product).await)
    }

    async fn select(&self, ctx: &RequestContext, id: i32) -> Result<Option<Product>> {
        let step = ctx
            .base_log()?
            .start_step(steps::PRODUCT_DATABASE_RETRIEVE_DATA)?;
        step.observe(self.select_row(ctx, id).await)
    }

    async fn update(&self, ctx: &RequestContext, product: &Product) -> Result<bool> {
        let step = ctx
            .base_log()?
            .start_step(steps::PRODUCT_DATABASE_UPDATE_DATA)?;
        step.observe(self.update_row(ctx, product).await)
    }

    async fn delete(&self, ctx: &RequestContext, id: i32) -> Result<bool> {
        let step = ctx
            .base_log()?
            .start_step(steps::PRODUCT_DATABASE_DELETE_DATA)?;
        step.observe(self.delete_row(ctx, id).await)
    }
}
