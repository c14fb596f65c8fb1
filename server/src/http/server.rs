use async_trait::async_trait;
use axum::{Router, routing::get};
use std::future::IntoFuture;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio::sync::{Notify, watch};
use tokio::time;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use super::{handlers, state::AppState};
use crate::runner::{DEFAULT_SHUTDOWN_TIMEOUT, Runnable, Signal};

pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Groups
        .route(
            "/config/:group",
            get(handlers::get_group).put(handlers::put_group),
        )
        // Configs
        .route(
            "/config/:group/:config",
            get(handlers::get_config).put(handlers::put_config),
        )
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listening {
    Pending,
    On(SocketAddr),
    Closed,
}

/// The HTTP CRUD listener as a [`Runnable`].
///
/// The socket is bound when `serve` starts, so a bind failure is reported
/// through the runner signal like any other serve error.
pub struct HttpServer {
    name: String,
    addr: SocketAddr,
    app: Router,
    shutdown_timeout: Duration,
    drain: Arc<Notify>,
    force: Notify,
    listening: watch::Sender<Listening>,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, app: Router) -> Self {
        let (listening, _) = watch::channel(Listening::Pending);
        Self {
            name: "http".to_string(),
            addr,
            app,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            drain: Arc::new(Notify::new()),
            force: Notify::new(),
            listening,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// How long `graceful_shutdown` lets open connections finish before the
    /// listener is closed regardless.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Wait until `serve` has bound its socket. Returns `None` if the server
    /// closed without ever listening.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        let mut listening = self.listening.subscribe();
        let state = match listening.wait_for(|l| *l != Listening::Pending).await {
            Ok(state) => *state,
            Err(_) => Listening::Closed,
        };
        match state {
            Listening::On(addr) => Some(addr),
            Listening::Pending | Listening::Closed => None,
        }
    }

    fn close(&self) {
        self.listening.send_replace(Listening::Closed);
    }
}

#[async_trait]
impl Runnable for HttpServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn serve(&self, signal: Signal) {
        let bound = match TcpListener::bind(self.addr).await {
            Ok(listener) => listener.local_addr().map(|addr| (listener, addr)),
            Err(e) => Err(e),
        };
        let (listener, local_addr) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                error!("Unable to listen on {}: {e}", self.addr);
                self.close();
                signal.raise(format!("unable to listen on {}: {e}", self.addr));
                return;
            }
        };

        self.listening.send_replace(Listening::On(local_addr));
        info!("Starting http server on {}", local_addr);

        let drain = Arc::clone(&self.drain);
        let server = axum::serve(listener, self.app.clone())
            .with_graceful_shutdown(async move { drain.notified().await });

        let result = tokio::select! {
            result = server.into_future() => result,
            () = self.force.notified() => {
                warn!("Forced http server on {} closed", local_addr);
                Ok(())
            }
        };
        self.close();

        match result {
            Ok(()) => info!("Http server on {} stopped", local_addr),
            Err(e) => {
                error!("Http server on {} failed: {e}", local_addr);
                signal.raise(e.to_string());
            }
        }
    }

    async fn graceful_shutdown(&self) {
        info!("Shutting down http server on {}", self.addr);
        self.drain.notify_one();

        let mut listening = self.listening.subscribe();
        let drained = time::timeout(
            self.shutdown_timeout,
            listening.wait_for(|l| *l == Listening::Closed),
        )
        .await
        .is_ok();

        if !drained {
            warn!(
                "Http server on {} did not drain within {:?}",
                self.addr, self.shutdown_timeout
            );
            self.force.notify_one();
        }
    }
}
