//! Destinations for completed request logs.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use super::base_log::{BaseLog, LogLevel};
use crate::error::Result;

/// Writes a finalized [`BaseLog`] somewhere durable.
///
/// Called exactly once per request. Callers must never let a failure here
/// change the response returned to the client.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn write_log(&self, log: &BaseLog) -> Result<()>;

    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Emits each request log as one structured `tracing` event.
///
/// The subscriber decides where the event lands (stdout, JSON, rolling file).
#[derive(Debug, Clone, Default)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LogSink for TracingLogSink {
    async fn write_log(&self, log: &BaseLog) -> Result<()> {
        let record = serde_json::to_string(log)?;
        let duration_ms = log
            .total_elapsed()
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let step_count = log.steps().len();
        let request_id = log.request_id();

        match log.level() {
            LogLevel::Info => info!(
                target: "observer::request_log",
                request_id,
                level = "INFO",
                step_count,
                duration_ms,
                record = %record,
                "Request completed"
            ),
            LogLevel::Warn => warn!(
                target: "observer::request_log",
                request_id,
                level = "WARN",
                step_count,
                duration_ms,
                record = %record,
                "Request completed"
            ),
            LogLevel::Error => error!(
                target: "observer::request_log",
                request_id,
                level = "ERROR",
                step_count,
                duration_ms,
                record = %record,
                "Request completed"
            ),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Appends one JSON document per line to a file.
pub struct JsonFileLogSink {
    path: PathBuf,
    file: tokio::sync::Mutex<File>,
}

impl JsonFileLogSink {
    /// Open (or create) `path` in append mode.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSink for JsonFileLogSink {
    async fn write_log(&self, log: &BaseLog) -> Result<()> {
        let mut line = serde_json::to_vec(log)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Keeps request logs in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    records: Arc<Mutex<Vec<BaseLog>>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records written so far, oldest first.
    pub fn records(&self) -> Vec<BaseLog> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn write_log(&self, log: &BaseLog) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(log.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
