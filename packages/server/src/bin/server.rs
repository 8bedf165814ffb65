//! WebSocket chat lobby with reconnectable sessions.
//!
//! Clients join with a username and receive a session token; presenting the
//! token again within the grace period resumes the same session.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin lobby-server
//! cargo run --bin lobby-server -- --host 0.0.0.0 --port 3000 --grace-period-secs 30
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use lobby_server::{
    config::ServerConfig,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryLobbyRepository,
        scheduler::TokioGraceScheduler,
    },
    ui::Server,
    usecase::ChatService,
};
use lobby_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "lobby-server")]
#[command(about = "WebSocket chat lobby with reconnectable sessions", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "LOBBY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "LOBBY_PORT", default_value = "8080")]
    port: u16,

    /// Seconds a disconnected session stays reconnectable
    #[arg(long, env = "LOBBY_GRACE_PERIOD_SECS", default_value = "60")]
    grace_period_secs: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "LOBBY_LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = match ServerConfig::new(
        args.host,
        args.port,
        Duration::from_secs(args.grace_period_secs),
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Grace period for reconnects: {}s",
        config.grace_period.as_secs()
    );

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. GraceScheduler
    // 4. ChatService
    // 5. Server

    // 1. Create Repository (in-memory lobby)
    let repository = Arc::new(InMemoryLobbyRepository::default());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::default());

    // 3. Create GraceScheduler (tokio timers)
    let (scheduler, expired_rx) = TokioGraceScheduler::with_channel(config.grace_period);

    // 4. Create ChatService
    let chat_service = Arc::new(ChatService::new(
        repository,
        message_pusher,
        Arc::new(scheduler),
        Arc::new(SystemClock),
    ));

    // 5. Create and run the server
    let server = Server::new(chat_service, expired_rx);
    if let Err(e) = server.run(&config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
