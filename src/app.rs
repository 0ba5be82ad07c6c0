//! Wires the refresh loop and the HTTP server together.

use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::collector::{FileSystem, RealFs};
use crate::config::Config;
use crate::metrics::Metrics;
use crate::refresh::RefreshLoop;
use crate::server::{self, BindError};
use crate::storage::MetricStore;

/// How long shutdown waits for a scan that is still running.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Fatal errors: anything here ends the process with a non-zero status.
#[derive(Debug)]
pub enum AppError {
    Registry(prometheus::Error),
    Bind(BindError),
    Serve(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Registry(e) => write!(f, "metrics registry: {}", e),
            AppError::Bind(e) => write!(f, "{}", e),
            AppError::Serve(e) => write!(f, "server error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Registry(e) => Some(e),
            AppError::Bind(e) => Some(e),
            AppError::Serve(e) => Some(e),
        }
    }
}

impl From<prometheus::Error> for AppError {
    fn from(e: prometheus::Error) -> Self {
        AppError::Registry(e)
    }
}

impl From<BindError> for AppError {
    fn from(e: BindError) -> Self {
        AppError::Bind(e)
    }
}

/// Runs the exporter against the real filesystem until SIGINT/SIGTERM.
pub async fn run(config: Config) -> Result<(), AppError> {
    run_with(config, RealFs::new(), shutdown_signal()).await
}

/// Runs the exporter against `fs` until `shutdown` resolves.
pub async fn run_with<F, S>(config: Config, fs: F, shutdown: S) -> Result<(), AppError>
where
    F: FileSystem + 'static,
    S: Future<Output = ()> + Send + 'static,
{
    info!(
        port = config.listen.port(),
        listen = %config.listen,
        data_dir = %config.data_dir.display(),
        interval_s = config.interval.as_secs(),
        verbose = config.verbose,
        "starting exporter"
    );

    let store = MetricStore::new();
    let metrics = Arc::new(Metrics::new(store.clone())?);
    let listener = server::bind(config.listen).await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let refresh = RefreshLoop::new(
        fs,
        config.data_dir.clone(),
        store,
        metrics.refresh(),
        config.interval,
    );
    let refresh_task = tokio::spawn(refresh.run(stop_rx));

    let router = server::create_router(metrics);
    let served = server::serve(listener, router, shutdown).await;

    let _ = stop_tx.send(true);
    stop_refresh(refresh_task, SHUTDOWN_GRACE).await;

    served.map_err(AppError::Serve)?;
    info!("shutdown complete");
    Ok(())
}

/// How the refresh task ended after being told to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshExit {
    Stopped,
    Failed,
    Abandoned,
}

/// Waits up to `grace` for the refresh task. An in-flight scan cannot be
/// cancelled, so a task still running after `grace` is left behind.
async fn stop_refresh(task: JoinHandle<()>, grace: Duration) -> RefreshExit {
    match tokio::time::timeout(grace, task).await {
        Ok(Ok(())) => RefreshExit::Stopped,
        Ok(Err(e)) => {
            error!(error = %e, panicked = e.is_panic(), "refresh loop task failed");
            RefreshExit::Failed
        }
        Err(_) => {
            warn!(
                grace_ms = grace.as_millis() as u64,
                "refresh still running at shutdown, abandoning it"
            );
            RefreshExit::Abandoned
        }
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
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

    info!("received shutdown signal");
}
