//! WebSocket hosting shell for the `tablehall` poker/UNO engine.
//!
//! Bootstraps the shared lobby registry, presence index, and the six
//! reserved public lobbies, then serves the command protocol over a
//! single `/ws` endpoint.

mod api;
mod config;
mod logging;
mod metrics;

use std::sync::Arc;

use anyhow::Error;
use pico_args::Arguments;
use tablehall::dispatch::Dispatcher;
use tablehall::lobby::{self, LobbyRegistry};
use tablehall::rewards::{NoopRewardsSink, RewardsSink};
use tablehall::session::PresenceRegistry;
use tracing::info;

use config::ServerConfig;

const HELP: &str = "\
Run the tablehall lobby server

USAGE:
  tablehall-server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                    Server bind address (e.g., 0.0.0.0:8080)
  TABLEHALL_MAX_PLAYERS          Seat cap per lobby
  TABLEHALL_SMALL_BLIND          Default poker small blind
  TABLEHALL_BIG_BLIND            Default poker big blind
  TABLEHALL_TURN_TIMEOUT_SECS    Per-turn clock
  TABLEHALL_RECONNECT_GRACE_SECS Reconnect grace window
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    logging::init();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override = pargs.opt_value_from_str("--bind")?;
    let config = ServerConfig::from_env(bind_override)
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;

    info!("Starting tablehall server at {}", config.bind);

    let registry = Arc::new(LobbyRegistry::new());
    let presence = Arc::new(PresenceRegistry::new());
    let rewards: Arc<dyn RewardsSink> = Arc::new(NoopRewardsSink);

    lobby::bootstrap_public_lobbies(&registry, &rewards).await;
    info!("Bootstrapped 3 public poker lobbies and 3 public UNO lobbies");

    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry), Arc::clone(&presence), rewards));
    let state = api::AppState::new(dispatcher, presence, registry);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind to {}: {}", config.bind, e))?;

    info!("Server is running at http://{}. Press Ctrl+C to stop.", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
