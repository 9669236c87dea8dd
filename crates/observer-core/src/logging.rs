//! Structured logging schema, field name constants, and request step names.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across the
//! controller, service and database layers.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed internally, cause attached to the step log |
//! | WARN  | Client error or not-found outcome, sink write failure |
//! | INFO  | Lifecycle events (startup, shutdown), completed request logs |
//! | DEBUG | Decision points, pool and configuration details |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across controller → service → repository.
/// Format: UUIDv7 (time-ordered) unless supplied by `x-request-id`.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "service", "database", "request_log"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "users", "products", "sink"
pub const COMPONENT: &str = "component";

/// Logical operation name.
pub const OPERATION: &str = "op";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of steps recorded for a request.
pub const STEP_COUNT: &str = "step_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Step names registered on the request log, one per layer operation.
pub mod steps {
    // Controller steps
    pub const GET_USER_BY_ID: &str = "GET_USER_BY_ID";
    pub const CREATE_NEW_USER: &str = "CREATE_NEW_USER";
    pub const EDIT_USER_BY_ID: &str = "EDIT_USER_BY_ID";
    pub const DELETE_USER_BY_ID: &str = "DELETE_USER_BY_ID";

    pub const GET_PRODUCT_BY_ID: &str = "GET_PRODUCT_BY_ID";
    pub const CREATE_NEW_PRODUCT: &str = "CREATE_NEW_PRODUCT";
    pub const EDIT_PRODUCT_BY_ID: &str = "EDIT_PRODUCT_BY_ID";
    pub const DELETE_PRODUCT_BY_ID: &str = "DELETE_PRODUCT_BY_ID";

    // Service steps
    pub const USER_SERVICE_CREATE_USER_PROCESSING: &str = "USER_SERVICE_CREATE_USER_PROCESSING";
    pub const USER_SERVICE_RETRIEVE_USER_PROCESSING: &str = "USER_SERVICE_RETRIEVE_USER_PROCESSING";
    pub const USER_SERVICE_UPDATE_USER_PROCESSING: &str = "USER_SERVICE_UPDATE_USER_PROCESSING";
    pub const USER_SERVICE_DELETE_USER_PROCESSING: &str = "USER_SERVICE_DELETE_USER_PROCESSING";

    pub const PRODUCT_SERVICE_CREATE_PRODUCT_PROCESSING: &str =
        "PRODUCT_SERVICE_CREATE_PRODUCT_PROCESSING";
    pub const PRODUCT_SERVICE_RETRIEVE_PRODUCT_PROCESSING: &str =
        "PRODUCT_SERVICE_RETRIEVE_PRODUCT_PROCESSING";
    pub const PRODUCT_SERVICE_UPDATE_PRODUCT_PROCESSING: &str =
        "PRODUCT_SERVICE_UPDATE_PRODUCT_PROCESSING";
    pub const PRODUCT_SERVICE_DELETE_PRODUCT_PROCESSING: &str =
        "PRODUCT_SERVICE_DELETE_PRODUCT_PROCESSING";

    // Database steps
    pub const USER_DATABASE_CREATE_DATA: &str = "USER_DATABASE_CREATE_DATA";
    pub const USER_DATABASE_RETRIEVE_DATA: &str = "USER_DATABASE_RETRIEVE_DATA";
    pub const USER_DATABASE_UPDATE_DATA: &str = "USER_DATABASE_UPDATE_DATA";
    pub const USER_DATABASE_DELETE_DATA: &str = "USER_DATABASE_DELETE_DATA";

    pub const PRODUCT_DATABASE_CREATE_DATA: &str = "PRODUCT_DATABASE_CREATE_DATA";
    pub const PRODUCT_DATABASE_RETRIEVE_DATA: &str = "PRODUCT_DATABASE_RETRIEVE_DATA";
    pub const PRODUCT_DATABASE_UPDATE_DATA: &str = "PRODUCT_DATABASE_UPDATE_DATA";
    pub const PRODUCT_DATABASE_DELETE_DATA: &str = "PRODUCT_DATABASE_DELETE_DATA";
}
