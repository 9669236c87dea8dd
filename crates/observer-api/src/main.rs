use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use observer_api::config::{Config, LogFormat, StepLogTarget};
use observer_api::{router, telemetry, AppState};
use observer_core::{JsonFileLogSink, LogSink, TracingLogSink};
use observer_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let _file_guard = telemetry::init(&config.logging);

    info!(
        log_format = match config.logging.format {
            LogFormat::Json => "json",
            LogFormat::Text => "text",
        },
        log_file = config
            .logging
            .file
            .as_deref()
            .and_then(|p| p.to_str())
            .unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect_with_config(&config.database_url, config.pool_config()).await?;
    info!("Database connected");

    if config.run_migrations {
        info!("Running database migrations...");
        db.migrate().await?;
        info!("Database migrations complete");
    }

    let sink: Arc<dyn LogSink> = match &config.step_log {
        StepLogTarget::Tracing => Arc::new(TracingLogSink::new()),
        StepLogTarget::File(path) => Arc::new(JsonFileLogSink::open(path).await?),
    };
    info!(sink = sink.name(), "Request log sink ready");

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        Arc::new(db.users.clone()),
        Arc::new(db.products.clone()),
        sink,
    )
    .with_shutdown(shutdown.clone())
    .with_request_timeout(config.request_timeout);

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM, then cancel every in-flight request.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
