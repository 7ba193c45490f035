use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use dus_api::background::auto_enrollment;
use dus_api::config::AppConfig;
use dus_api::reports::ReportStore;
use dus_api::router::build_app_router;
use dus_api::state::AppState;
use dus_api::telemetry;

/// How long shutdown waits for the enrollment loop to finish.
const LOOP_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Dynamic user segmentation service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(
        short,
        long,
        env = "DUS_CONFIG",
        default_value = "./configs/dynamic-user-segmentation.yaml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // --- Configuration ---
    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // --- Tracing ---
    if let Err(e) = telemetry::init(&config.logger) {
        eprintln!("logger setup failed: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Startup failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        reports_dir = %config.reports.dir.display(),
        "Loaded configuration"
    );

    // --- Database ---
    let pool = dus_db::create_pool(&config.postgres.to_pool_settings())
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    dus_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    dus_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Auto-enrollment ---
    let enrollment_cancel = CancellationToken::new();
    let enrollment_handle = if config.auto_enrollment.enabled {
        Some(tokio::spawn(auto_enrollment::run(
            pool.clone(),
            config.auto_enrollment.interval(),
            enrollment_cancel.clone(),
        )))
    } else {
        tracing::info!("Auto-enrollment disabled");
        None
    };

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        reports: Arc::new(ReportStore::new(config.reports.dir.clone())),
    };
    let app = build_app_router(state, &config.server);

    // --- Start server ---
    let bind = (config.server.host.as_str(), config.server.port);
    let served = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => {
            tracing::info!(
                host = %config.server.host,
                port = config.server.port,
                "Starting server"
            );
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Server error")
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to bind to address")),
    };

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    enrollment_cancel.cancel();
    if let Some(handle) = enrollment_handle {
        if tokio::time::timeout(LOOP_SHUTDOWN_TIMEOUT, handle).await.is_err() {
            tracing::warn!("Auto-enrollment loop did not stop in time");
        }
    }

    pool.close().await;
    tracing::info!("Database pool closed");

    served?;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles SIGINT (Ctrl-C), and on Unix SIGTERM and SIGHUP, so the server
/// shuts down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(unix)]
    let hangup = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())
            .expect("Failed to install SIGHUP handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    #[cfg(not(unix))]
    let hangup = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
        () = hangup => {
            tracing::info!("Received SIGHUP, starting graceful shutdown");
        }
    }
}
