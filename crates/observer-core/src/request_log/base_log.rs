//! Per-request log aggregator and its shared handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::step::StepLog;
use crate::error::{Error, Result};

/// Severity of a completed request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// A step together with the name it was registered under.
#[derive(Debug, Clone, Serialize)]
pub struct NamedStep {
    pub name: String,
    #[serde(flatten)]
    pub step: StepLog,
}

/// Everything recorded about one request: payloads, level and ordered steps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseLog {
    request_id: String,
    created_at: DateTime<Utc>,
    level: LogLevel,
    request: JsonValue,
    response: JsonValue,
    steps: Vec<NamedStep>,
}

impl BaseLog {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            created_at: Utc::now(),
            level: LogLevel::default(),
            request: JsonValue::Null,
            response: JsonValue::Null,
            steps: Vec::new(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn request(&self) -> &JsonValue {
        &self.request
    }

    pub fn response(&self) -> &JsonValue {
        &self.response
    }

    pub fn steps(&self) -> &[NamedStep] {
        &self.steps
    }

    /// First step registered under `name`.
    pub fn step(&self, name: &str) -> Option<&StepLog> {
        self.steps.iter().find(|s| s.name == name).map(|s| &s.step)
    }

    /// Step names in registration order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Elapsed time of the outermost (first) step.
    pub fn total_elapsed(&self) -> Option<Duration> {
        self.steps.first().and_then(|s| s.step.elapsed())
    }

    /// Append a step. Names are not deduplicated.
    pub fn add_step(&mut self, name: impl Into<String>, step: StepLog) -> usize {
        self.steps.push(NamedStep {
            name: name.into(),
            step,
        });
        self.steps.len() - 1
    }

    fn stop_running_steps(&mut self) {
        for named in self.steps.iter_mut().filter(|s| s.step.is_running()) {
            named.step.stop();
        }
    }
}

/// Shared handle to the request's [`BaseLog`].
///
/// Cloning the handle does not copy the log. Once [`RequestLog::finish`] has
/// taken the log out, every further access fails with
/// [`Error::NoActiveRequestContext`].
#[derive(Debug, Clone)]
pub struct RequestLog {
    inner: Arc<Mutex<Option<BaseLog>>>,
}

impl RequestLog {
    /// Allocate a fresh log for a new request.
    pub fn create(request_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(BaseLog::new(request_id)))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<BaseLog>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_log<R>(&self, f: impl FnOnce(&mut BaseLog) -> R) -> Result<R> {
        self.lock()
            .as_mut()
            .map(f)
            .ok_or(Error::NoActiveRequestContext)
    }

    fn with_step<R>(&self, index: usize, f: impl FnOnce(&mut StepLog) -> R) -> Result<R> {
        self.with_log(|log| log.steps.get_mut(index).map(|s| f(&mut s.step)))?
            .ok_or_else(|| Error::Internal(format!("step index {index} out of range")))
    }

    /// False once the log has been finalized.
    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    pub fn add_step(&self, name: impl Into<String>, step: StepLog) -> Result<usize> {
        self.with_log(|log| log.add_step(name, step))
    }

    /// Register a step, start it and return a guard that stops it on drop.
    pub fn start_step(&self, name: impl Into<String>) -> Result<StepTimer> {
        let mut step = StepLog::new();
        step.start();
        let index = self.add_step(name, step)?;
        Ok(StepTimer {
            log: self.clone(),
            index,
            stopped: false,
        })
    }

    pub fn set_request<T>(&self, request: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(request)?;
        self.with_log(|log| log.request = value)
    }

    pub fn set_response<T>(&self, response: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(response)?;
        self.with_log(|log| log.response = value)
    }

    pub fn set_level(&self, level: LogLevel) -> Result<()> {
        self.with_log(|log| log.level = level)
    }

    pub fn level(&self) -> Result<LogLevel> {
        self.with_log(|log| log.level)
    }

    /// Copy of the log as it currently stands.
    pub fn snapshot(&self) -> Result<BaseLog> {
        self.with_log(|log| log.clone())
    }

    /// Take the log out of the handle for the sink write.
    ///
    /// Steps still running are stopped first so the record is complete.
    pub fn finish(&self) -> Result<BaseLog> {
        let mut guard = self.lock();
        let mut log = guard.take().ok_or(Error::NoActiveRequestContext)?;
        log.stop_running_steps();
        Ok(log)
    }
}

/// Guard for a running step; stops the step when dropped.
#[must_use = "dropping the timer stops the step immediately"]
#[derive(Debug)]
pub struct StepTimer {
    log: RequestLog,
    index: usize,
    stopped: bool,
}

impl StepTimer {
    /// Record `err` on the step without affecting propagation.
    pub fn capture_error<E>(&self, err: &E)
    where
        E: std::error::Error + ?Sized,
    {
        // A finalized log is immutable.
        let _ = self.log.with_step(self.index, |step| step.capture_error(err));
    }

    pub fn capture_message(&self, message: impl Into<String>) {
        let message = message.into();
        let _ = self
            .log
            .with_step(self.index, |step| step.capture_message(message));
    }

    /// Capture the error of `result`, if any, and hand the result back.
    pub fn observe<T, E>(&self, result: std::result::Result<T, E>) -> std::result::Result<T, E>
    where
        E: std::error::Error,
    {
        if let Err(err) = &result {
            self.capture_error(err);
        }
        result
    }

    pub fn stop(mut self) {
        self.stop_once();
    }

    fn stop_once(&mut self) {
        if !self.stopped {
            self.stopped = true;
            let _ = self.log.with_step(self.index, StepLog::stop);
        }
    }
}

impl Drop for StepTimer {
    fn drop(&mut self) {
        self.stop_once();
    }
}
