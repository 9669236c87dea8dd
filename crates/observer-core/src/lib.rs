//! # observer-core
//!
//! Core types, traits, and the per-request logging pipeline for observer.
//!
//! This crate provides the entities, request payloads, validation rules,
//! request context and repository traits that the database and API crates
//! depend on.

pub mod context;
pub mod error;
pub mod logging;
pub mod models;
pub mod request_log;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use context::RequestContext;
pub use error::{Error, Result};
pub use models::*;
pub use request_log::{
    BaseLog, JsonFileLogSink, LogLevel, LogSink, MemoryLogSink, RequestLog, StepLog, StepTimer,
    TracingLogSink,
};
pub use traits::*;
pub use validation::{validate_product, validate_user, ValidationError};
