//! Stopwatch record for a single named operation.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::debug;

/// Timed record of one unit of work owned by one layer.
///
/// `start()` may be called again to reset the measurement (last call wins).
/// `stop()` without a prior `start()` leaves `elapsed` unset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepLog {
    #[serde(skip)]
    started: Option<Instant>,
    started_at: Option<DateTime<Utc>>,
    #[serde(rename = "elapsedMs", serialize_with = "serialize_elapsed_ms")]
    elapsed: Option<Duration>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    captured_error: Option<String>,
}

impl StepLog {
    /// Create an unstarted step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current time as the start of the step.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.started_at = Some(Utc::now());
        self.elapsed = None;
    }

    /// Compute the elapsed time since the last `start()`.
    pub fn stop(&mut self) {
        match self.started {
            Some(started) => self.elapsed = Some(started.elapsed()),
            None => debug!(
                subsystem = "request_log",
                component = "step",
                "stop() called on a step that was never started"
            ),
        }
    }

    /// Attach an error to this step. Propagation is left to the caller.
    pub fn capture_error<E>(&mut self, err: &E)
    where
        E: std::error::Error + ?Sized,
    {
        self.captured_error = Some(describe_error(err));
    }

    /// Attach a free-form failure description (e.g. a caught panic).
    pub fn capture_message(&mut self, message: impl Into<String>) {
        self.captured_error = Some(message.into());
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn captured_error(&self) -> Option<&str> {
        self.captured_error.as_deref()
    }

    /// True once started and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.started.is_some() && self.elapsed.is_none()
    }
}

/// Render an error together with its `source()` chain.
pub fn describe_error<E>(err: &E) -> String
where
    E: std::error::Error + ?Sized,
{
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

fn serialize_elapsed_ms<S>(elapsed: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match elapsed {
        Some(d) => serializer.serialize_some(&(d.as_secs_f64() * 1000.0)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "query failed")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connection reset")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    impl std::error::Error for Inner {}

    #[test]
    fn test_new_step_is_idle() {
        let step = StepLog::new();
        assert!(step.started_at().is_none());
        assert!(step.elapsed().is_none());
        assert!(step.captured_error().is_none());
        assert!(!step.is_running());
    }

    #[test]
    fn test_start_then_stop_measures_elapsed() {
        let mut step = StepLog::new();
        step.start();
        assert!(step.is_running());
        step.stop();

        assert!(!step.is_running());
        assert!(step.started_at().is_some());
        assert!(step.elapsed().is_some());
    }

    #[test]
    fn test_stop_without_start_leaves_elapsed_unset() {
        let mut step = StepLog::new();
        step.stop();
        assert!(step.elapsed().is_none());
    }

    #[test]
    fn test_second_start_resets_measurement() {
        let mut step = StepLog::new();
        step.start();
        let first = step.started_at().unwrap();
        std::thread::sleep(Duration::from_millis(30));

        step.start();
        step.stop();

        assert!(step.started_at().unwrap() >= first);
        assert!(step.elapsed().unwrap() < Duration::from_millis(30));
    }

    #[test]
    fn test_capture_error_includes_source_chain() {
        let mut step = StepLog::new();
        step.capture_error(&Outer(Inner));
        assert_eq!(step.captured_error(), Some("query failed: connection reset"));
    }

    #[test]
    fn test_capture_message() {
        let mut step = StepLog::new();
        step.capture_message("panic: boom");
        assert_eq!(step.captured_error(), Some("panic: boom"));
    }

    #[test]
    fn test_serialized_shape() {
        let mut step = StepLog::new();
        step.start();
        step.stop();
        let json = serde_json::to_value(&step).unwrap();

        assert!(json.get("startedAt").is_some());
        assert!(json["elapsedMs"].as_f64().unwrap() >= 0.0);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_serialized_unstopped_step_has_null_elapsed() {
        let step = StepLog::new();
        let json = serde_json::to_value(&step).unwrap();
        assert!(json["elapsedMs"].is_null());
    }
}
