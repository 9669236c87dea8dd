//! Repository traits implemented by the database crate and by test doubles.
//!
//! Every method receives the request context so the implementation can
//! register its step on the request log and honour cancellation. "No rows"
//! is a normal outcome: `None` for selects, `false` for updates and deletes.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::Result;
use crate::models::{Product, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the generated identity.
    async fn insert(&self, ctx: &RequestContext, user: &User) -> Result<i32>;

    async fn select(&self, ctx: &RequestContext, id: i32) -> Result<Option<User>>;

    /// Replace the row with `user.id`. Returns false when no row matched.
    async fn update(&self, ctx: &RequestContext, user: &User) -> Result<bool>;

    /// Returns false when no row matched.
    async fn delete(&self, ctx: &RequestContext, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and return the generated identity.
    async fn insert(&self, ctx: &RequestContext, product: &Product) -> Result<i32>;

    async fn select(&self, ctx: &RequestContext, id: i32) -> Result<Option<Product>>;

    /// Replace the row with `product.id`. Returns false when no row matched.
    async fn update(&self, ctx: &RequestContext, product: &Product) -> Result<bool>;

    /// Returns false when no row matched.
    async fn delete(&self, ctx: &RequestContext, id: i32) -> Result<bool>;
}
