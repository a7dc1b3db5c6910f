//! HTTP server lifecycle
//!
//! Wraps the API router in the tower middleware stack, binds the listener and
//! drains in-flight requests on shutdown.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use roster_core::config::ServerConfig;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::{router, AppState};

/// Build the application: API routes plus request logging, panic recovery
/// and the request timeout
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    router(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Bind to the configured address and serve until SIGINT or SIGTERM
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Server listening");

    serve_with_shutdown(
        listener,
        app(state, config.request_timeout),
        shutdown_signal(),
        config.shutdown_timeout,
    )
    .await
}

/// Serve on an existing listener until `signal` resolves
///
/// After the signal the listener stops accepting and in-flight requests get
/// `grace` to finish. Requests still running after that are dropped.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        _ = signal => {}
    }

    tracing::info!(grace = ?grace, "Shutting down, draining requests");
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => result??,
        Err(_) => {
            tracing::warn!("Shutdown grace period elapsed, dropping remaining requests");
            server.abort();
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
