//! Service layer for observer-api.
//!
//! Each service method registers its own step on the request log, calls the
//! repository and turns the outcome into a response envelope or an
//! [`ApiError`](crate::error::ApiError).

pub mod product_service;
pub mod user_service;

pub use product_service::{ProductEnvelope, ProductService};
pub use user_service::{UserEnvelope, UserService};
