//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, sync::mpsc};
use tower_http::trace::TraceLayer;

use crate::{domain::GraceExpired, usecase::ChatService};

use super::{
    handler::{get_presence, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Build the axum router for a chat service.
pub fn router(chat_service: Arc<ChatService>) -> Router {
    let app_state = Arc::new(AppState { chat_service });

    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/presence", get(get_presence))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// WebSocket chat lobby server
///
/// Owns the chat service and the receiving end of the grace scheduler's
/// expiry channel; the expiry loop is started together with the listener.
///
/// # Example
///
/// ```ignore
/// let (scheduler, expired_rx) = TokioGraceScheduler::with_channel(config.grace_period);
/// let chat_service = Arc::new(ChatService::new(repository, pusher, Arc::new(scheduler), clock));
/// Server::new(chat_service, expired_rx).run(&config.host, config.port).await?;
/// ```
pub struct Server {
    chat_service: Arc<ChatService>,
    expired_rx: mpsc::UnboundedReceiver<GraceExpired>,
}

impl Server {
    pub fn new(
        chat_service: Arc<ChatService>,
        expired_rx: mpsc::UnboundedReceiver<GraceExpired>,
    ) -> Self {
        Self {
            chat_service,
            expired_rx,
        }
    }

    /// Bind to `host:port` and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat lobby listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let expiry_loop = tokio::spawn(self.chat_service.clone().run_expiry_loop(self.expired_rx));

        let result = axum::serve(listener, router(self.chat_service))
            .with_graceful_shutdown(shutdown)
            .await;

        expiry_loop.abort();
        result
    }
}
