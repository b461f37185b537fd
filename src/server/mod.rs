use crate::catalog::{self, Metadata};
use crate::config::Config;
use crate::refresh::run_refresh_loop;
use crate::store::CatalogStore;
use anyhow::{Context, Result};
use axum::extract::ConnectInfo;
use axum::{middleware, routing::get, Extension, Router};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tower::Layer;
use tower_http::trace::TraceLayer;

pub mod access_log;
mod error;
pub mod routes_feed;
pub mod routes_media;
pub mod routes_static;

pub use error::ServeError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    /// Current catalog snapshot
    pub store: Arc<CatalogStore>,
    /// Feed metadata, fixed at startup
    pub metadata: Arc<Metadata>,
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/feed", get(routes_feed::feed))
        .route("/cover.png", get(routes_static::cover))
        .route("/*path", get(routes_media::serve_media))
        .layer(middleware::from_fn(access_log::access_log))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// A bound server with its initial catalog, ready to run.
pub struct Server {
    ctx: AppContext,
    listener: TcpListener,
    refresh_period: Duration,
    shutdown_grace: Duration,
}

impl Server {
    /// Build the first snapshot, then bind the listener.
    ///
    /// Both steps are fatal on failure, and connections are only accepted
    /// once the store holds a snapshot.
    pub async fn bind(config: &Config) -> Result<Self> {
        let metadata = Arc::new(config.metadata());

        let md = metadata.clone();
        let initial = tokio::task::spawn_blocking(move || catalog::build(&md))
            .await
            .context("Catalog scan task failed")?
            .with_context(|| {
                format!("Failed to build catalog from {:?}", metadata.local_root())
            })?;

        tracing::info!(
            "Catalog built from {:?}: {} items",
            metadata.local_root(),
            initial.len()
        );

        let store = Arc::new(CatalogStore::new(initial));

        let host = config.server.host.as_str();
        let port = config.server.port;
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind to {host}:{port}"))?;

        Ok(Self {
            ctx: AppContext { store, metadata },
            listener,
            refresh_period: Duration::from_secs(config.feed.refresh_interval_secs),
            shutdown_grace: Duration::from_secs(config.server.shutdown_grace_secs),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until a shutdown signal arrives or `cancel` fires.
    ///
    /// After shutdown starts no new connections are accepted; open
    /// connections get the configured grace period, then are closed.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let Self {
            ctx,
            listener,
            refresh_period,
            shutdown_grace,
        } = self;

        let addr = listener.local_addr()?;
        tracing::info!("Serving {} files", ctx.store.read().len());
        tracing::info!("Add {}feed to your podcast app", ctx.metadata.external_url());
        tracing::info!("Server is listening on {}", addr);

        let refresh_handle = tokio::spawn(run_refresh_loop(
            ctx.store.clone(),
            ctx.metadata.clone(),
            refresh_period,
            cancel.clone(),
        ));

        let signal_cancel = cancel.clone();
        let signal_handle = tokio::spawn(async move {
            shutdown_signal(signal_cancel.clone()).await;
            signal_cancel.cancel();
        });

        let app = create_router(ctx);
        run_accept_loop(listener, app, cancel.clone(), shutdown_grace).await;

        cancel.cancel();
        let _ = signal_handle.await;
        if refresh_handle.await.is_err() {
            tracing::error!("Catalog refresh task panicked");
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Accept connections until `cancel` fires, then drain the open ones.
///
/// Each connection runs on its own task in a [`JoinSet`], so connections
/// still open when `grace` runs out can be aborted.
async fn run_accept_loop(
    listener: TcpListener,
    app: Router,
    cancel: CancellationToken,
    grace: Duration,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, remote_addr)) => {
                        connections.spawn(handle_connection(
                            stream,
                            remote_addr,
                            app.clone(),
                            cancel.clone(),
                        ));
                    }
                    Err(e) => {
                        tracing::debug!("Accept error: {e}");
                    }
                }
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            _ = cancel.cancelled() => break,
        }
    }

    // Stop accepting before draining.
    drop(listener);

    if connections.is_empty() {
        return;
    }
    tracing::info!(
        "Waiting up to {}s for {} open connections",
        grace.as_secs(),
        connections.len()
    );

    let drain = async { while connections.join_next().await.is_some() {} };
    if tokio::time::timeout(grace, drain).await.is_err() {
        tracing::warn!(
            "{} connections still open after {}s; closing them",
            connections.len(),
            grace.as_secs()
        );
        connections.shutdown().await;
    }
}

/// Serve one HTTP/1.1 connection, switching it to graceful shutdown (finish
/// the current response, then close) once `cancel` fires.
async fn handle_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    app: Router,
    cancel: CancellationToken,
) {
    let io = TokioIo::new(stream);
    let service = TowerToHyperService::new(Extension(ConnectInfo(remote_addr)).layer(app));
    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    let mut shutting_down = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!("Connection error from {remote_addr}: {e}");
                }
                break;
            }
            _ = cancel.cancelled(), if !shutting_down => {
                shutting_down = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

/// Wait for SIGINT, SIGTERM, or cancellation.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Shutdown signal received"); }
        _ = terminate => { tracing::info!("Shutdown signal received"); }
        _ = cancel.cancelled() => {}
    }
}
