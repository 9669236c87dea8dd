//! Per-request step logging.
//!
//! One [`RequestLog`] is created by the outermost layer of every request. Each
//! layer registers a named step on it, the controller records the final
//! response and level, and the finished [`BaseLog`] is written once to a
//! [`LogSink`].
//!
//! ```rust
//! use observer_core::request_log::{LogLevel, RequestLog};
//!
//! let log = RequestLog::create("req-1");
//! let step = log.start_step("GET_USER_BY_ID").unwrap();
//! log.set_level(LogLevel::Info).unwrap();
//! step.stop();
//!
//! let record = log.finish().unwrap();
//! assert_eq!(record.steps().len(), 1);
//! assert!(!log.is_active());
//! ```

mod base_log;
mod sink;
mod step;

pub use base_log::{BaseLog, LogLevel, NamedStep, RequestLog, StepTimer};
pub use sink::{JsonFileLogSink, LogSink, MemoryLogSink, TracingLogSink};
pub use step::{describe_error, StepLog};
