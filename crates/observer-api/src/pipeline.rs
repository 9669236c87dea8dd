//! The controller convention shared by every user and product endpoint.
//!
//! One call of [`run_controller`] owns the whole request log lifecycle:
//! record the request, time the controller step, run the endpoint work, map
//! failures to envelopes, pick the level, and write the log exactly once.

use std::any::Any;
use std::error::Error as StdError;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use axum::http::StatusCode;
use futures::FutureExt;
use serde::Serialize;
use tracing::{error, warn};

use observer_core::request_log::describe_error;
use observer_core::{LogLevel, LogSink, RequestContext, StepTimer};

use crate::envelope::ResponseEnvelope;
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};

/// Level for a request that completed without an error: INFO on the
/// endpoint's expected status, WARN for other non-5xx outcomes, ERROR for
/// server errors. Failures use [`ApiError::level`] instead.
pub fn level_for(status: StatusCode, expected: StatusCode) -> LogLevel {
    if status == expected {
        LogLevel::Info
    } else if status.is_server_error() {
        LogLevel::Error
    } else {
        LogLevel::Warn
    }
}

/// Run one controller invocation.
///
/// `work` receives a clone of the context and performs validation and the
/// service call. Its failures, including panics, become envelopes here; sink
/// failures are logged and never change the returned envelope.
pub async fn run_controller<T, R, F, Fut>(
    sink: &dyn LogSink,
    ctx: RequestContext,
    step_name: &'static str,
    request: &R,
    expected: StatusCode,
    work: F,
) -> ResponseEnvelope<T>
where
    T: Serialize,
    R: Serialize + ?Sized,
    F: FnOnce(RequestContext) -> Fut,
    Fut: Future<Output = Result<ResponseEnvelope<T>, ApiError>>,
{
    let step = begin(&ctx, step_name, request);

    let outcome = AssertUnwindSafe(work(ctx.clone())).catch_unwind().await;

    let (envelope, level) = match outcome {
        Ok(Ok(envelope)) => {
            let level = level_for(envelope.status(), expected);
            (envelope, level)
        }
        Ok(Err(err)) => {
            report_failure(&ctx, step.as_ref(), step_name, &err);
            let level = err.level();
            (err.into_envelope(), level)
        }
        Err(panic) => {
            let message = format!("panic: {}", panic_message(panic.as_ref()));
            if let Some(step) = &step {
                step.capture_message(message.clone());
            }
            error!(
                subsystem = "api",
                component = "controller",
                request_id = ctx.request_id(),
                step = step_name,
                error = %message,
                "Controller panicked"
            );
            (
                ResponseEnvelope::message(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE),
                LogLevel::Error,
            )
        }
    };

    finish(sink, &ctx, step, &envelope, level).await;
    envelope
}

fn begin<R>(ctx: &RequestContext, step_name: &'static str, request: &R) -> Option<StepTimer>
where
    R: Serialize + ?Sized,
{
    let started = ctx.base_log().and_then(|log| {
        log.set_request(request)?;
        log.start_step(step_name)
    });

    match started {
        Ok(step) => Some(step),
        Err(err) => {
            warn!(
                subsystem = "api",
                component = "controller",
                request_id = ctx.request_id(),
                step = step_name,
                error = %err,
                "Could not start controller step"
            );
            None
        }
    }
}

fn report_failure(
    ctx: &RequestContext,
    step: Option<&StepTimer>,
    step_name: &'static str,
    err: &ApiError,
) {
    if err.source().is_some() {
        if let Some(step) = step {
            step.capture_error(err);
        }
    }

    match err.level() {
        LogLevel::Error => error!(
            subsystem = "api",
            component = "controller",
            request_id = ctx.request_id(),
            step = step_name,
            status = err.status().as_u16(),
            error = %describe_error(err),
            "Request failed"
        ),
        _ => warn!(
            subsystem = "api",
            component = "controller",
            request_id = ctx.request_id(),
            step = step_name,
            status = err.status().as_u16(),
            details = %err,
            "Request rejected"
        ),
    }
}

async fn finish<T: Serialize>(
    sink: &dyn LogSink,
    ctx: &RequestContext,
    step: Option<StepTimer>,
    envelope: &ResponseEnvelope<T>,
    level: LogLevel,
) {
    if let Ok(log) = ctx.base_log() {
        if let Err(err) = log.set_response(envelope) {
            warn!(
                request_id = ctx.request_id(),
                error = %err,
                "Could not record response on request log"
            );
        }
        if let Err(err) = log.set_level(level) {
            warn!(
                request_id = ctx.request_id(),
                error = %err,
                "Could not record level on request log"
            );
        }
    }

    if let Some(step) = step {
        step.stop();
    }

    let record = match ctx.finish() {
        Ok(record) => record,
        Err(err) => {
            warn!(
                request_id = ctx.request_id(),
                error = %err,
                "Request log already finalized"
            );
            return;
        }
    };

    if let Err(err) = sink.write_log(&record).await {
        warn!(
            subsystem = "request_log",
            component = sink.name(),
            request_id = ctx.request_id(),
            error = %err,
            "Failed to write request log"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use observer_core::{BaseLog, MemoryLogSink};
    use serde_json::json;

    struct FailingSink;

    #[async_trait]
    impl LogSink for FailingSink {
        async fn write_log(&self, _log: &BaseLog) -> observer_core::Result<()> {
            Err(observer_core::Error::Internal("disk full".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(StatusCode::OK, StatusCode::OK), LogLevel::Info);
        assert_eq!(
            level_for(StatusCode::CREATED, StatusCode::CREATED),
            LogLevel::Info
        );
        assert_eq!(
            level_for(StatusCode::BAD_REQUEST, StatusCode::OK),
            LogLevel::Warn
        );
        assert_eq!(
            level_for(StatusCode::NOT_FOUND, StatusCode::OK),
            LogLevel::Warn
        );
        assert_eq!(
            level_for(StatusCode::INTERNAL_SERVER_ERROR, StatusCode::CREATED),
            LogLevel::Error
        );
    }

    #[tokio::test]
    async fn test_success_writes_one_info_record() {
        let sink = MemoryLogSink::new();
        let ctx = RequestContext::new("req-ok");

        let envelope = run_controller(
            &sink,
            ctx,
            "STEP",
            &json!({"id": 1}),
            StatusCode::OK,
            |_ctx| async { Ok(ResponseEnvelope::with_data(StatusCode::OK, "done", 1)) },
        )
        .await;

        assert_eq!(envelope.response_code, 200);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].request_id(), "req-ok");
        assert_eq!(records[0].level(), LogLevel::Info);
        assert_eq!(records[0].request(), &json!({"id": 1}));
        assert_eq!(records[0].response()["details"], "done");
        assert!(records[0].step("STEP").unwrap().elapsed().is_some());
    }

    #[tokio::test]
    async fn test_client_error_is_warn_without_captured_error() {
        let sink = MemoryLogSink::new();
        let envelope: ResponseEnvelope<()> = run_controller(
            &sink,
            RequestContext::new("req-404"),
            "STEP",
            &(),
            StatusCode::OK,
            |_ctx| async { Err(ApiError::NotFound(crate::error::Resource::User)) },
        )
        .await;

        assert_eq!(envelope.response_code, 404);
        let record = &sink.records()[0];
        assert_eq!(record.level(), LogLevel::Warn);
        assert!(record.step("STEP").unwrap().captured_error().is_none());
    }

    #[tokio::test]
    async fn test_internal_error_is_captured_but_not_returned() {
        let sink = MemoryLogSink::new();
        let envelope: ResponseEnvelope<()> = run_controller(
            &sink,
            RequestContext::new("req-500"),
            "STEP",
            &(),
            StatusCode::OK,
            |_ctx| async { Err(ApiError::Internal(observer_core::Error::Cancelled)) },
        )
        .await;

        assert_eq!(envelope.response_code, 500);
        assert_eq!(envelope.details, INTERNAL_ERROR_MESSAGE);

        let record = &sink.records()[0];
        assert_eq!(record.level(), LogLevel::Error);
        let captured = record.step("STEP").unwrap().captured_error().unwrap();
        assert!(captured.contains("Operation cancelled"));
    }

    #[tokio::test]
    async fn test_create_without_identity_is_warn() {
        let sink = MemoryLogSink::new();
        let envelope: ResponseEnvelope<()> = run_controller(
            &sink,
            RequestContext::new("req-no-id"),
            "STEP",
            &(),
            StatusCode::CREATED,
            |_ctx| async { Err(ApiError::CreateFailed(crate::error::Resource::User)) },
        )
        .await;

        assert_eq!(envelope.response_code, 500);
        let record = &sink.records()[0];
        assert_eq!(record.level(), LogLevel::Warn);
        assert_eq!(record.response()["responseCode"], 500);
    }

    #[tokio::test]
    async fn test_log_finalized_inside_work_still_returns_envelope() {
        let sink = MemoryLogSink::new();
        let envelope = run_controller(
            &sink,
            RequestContext::new("req-early"),
            "STEP",
            &(),
            StatusCode::OK,
            |ctx| async move {
                ctx.finish()?;
                Ok(ResponseEnvelope::with_data(StatusCode::OK, "done", 1))
            },
        )
        .await;

        assert_eq!(envelope.response_code, 200);
        assert_eq!(envelope.data, Some(1));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_panic_maps_to_internal_envelope() {
        let sink = MemoryLogSink::new();
        let envelope: ResponseEnvelope<()> = run_controller(
            &sink,
            RequestContext::new("req-panic"),
            "STEP",
            &(),
            StatusCode::OK,
            |_ctx| async {
                if true {
                    panic!("boom");
                }
                Ok(ResponseEnvelope::message(StatusCode::OK, "unreachable"))
            },
        )
        .await;

        assert_eq!(envelope.response_code, 500);
        let record = &sink.records()[0];
        assert_eq!(record.level(), LogLevel::Error);
        assert_eq!(
            record.step("STEP").unwrap().captured_error(),
            Some("panic: boom")
        );
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_change_envelope() {
        let envelope = run_controller(
            &FailingSink,
            RequestContext::new("req-sink"),
            "STEP",
            &(),
            StatusCode::CREATED,
            |_ctx| async { Ok(ResponseEnvelope::with_data(StatusCode::CREATED, "made", 5)) },
        )
        .await;

        assert_eq!(envelope.response_code, 201);
        assert_eq!(envelope.data, Some(5));
    }

    #[tokio::test]
    async fn test_inner_steps_follow_controller_step() {
        let sink = MemoryLogSink::new();
        let _: ResponseEnvelope<()> = run_controller(
            &sink,
            RequestContext::new("req-nested"),
            "CONTROLLER",
            &(),
            StatusCode::OK,
            |ctx| async move {
                let log = ctx.base_log()?;
                log.start_step("SERVICE")?.stop();
                log.start_step("DATABASE")?.stop();
                Ok(ResponseEnvelope::message(StatusCode::OK, "ok"))
            },
        )
        .await;

        let record = &sink.records()[0];
        assert_eq!(
            record.step_names(),
            vec!["CONTROLLER", "SERVICE", "DATABASE"]
        );
    }
}
