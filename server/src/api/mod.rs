//! WebSocket hosting shell for the `tablehall` engine.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP/WebSocket
//! - **Tower**: Middleware for CORS and request correlation
//! - **`tablehall::dispatch::Dispatcher`**: owns the registry/presence/
//!   rewards plumbing and turns every `Command` into an `Ack`
//!
//! Identity is caller-supplied, not validated here — per
//! `tablehall::identity::UserId`'s own doc comment, the engine (and this
//! shell) never authenticates it. Pairing a `UserId` with a real account
//! is a concern for whatever sits in front of this server.
//!
//! # Endpoints
//!
//! - `GET /health` - Liveness check (public)
//! - `GET /ws?user_id=<id>&nickname=<name>` - WebSocket session (public)

pub mod request_id;
pub mod websocket;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64};

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde_json::json;
use tablehall::dispatch::Dispatcher;
use tablehall::identity::GameType;
use tablehall::lobby::SharedRegistry;
use tablehall::session::SharedPresence;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket
/// connections. Cheap to clone — every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub presence: SharedPresence,
    pub registry: SharedRegistry,
    /// Monotonic connection id source, handed out once per upgraded socket.
    pub conn_seq: Arc<AtomicU64>,
    /// Live WebSocket connection count, for `metrics::websocket_connections_active`.
    pub active_connections: Arc<AtomicI64>,
}

impl AppState {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, presence: SharedPresence, registry: SharedRegistry) -> Self {
        Self {
            dispatcher,
            presence,
            registry,
            conn_seq: Arc::new(AtomicU64::new(1)),
            active_connections: Arc::new(AtomicI64::new(0)),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// There is no database to probe; this reports whether the registry is
/// reachable and how many public lobbies of each game type are live.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let poker_public = state.registry.list_public(Some(GameType::Poker)).await.len();
    let uno_public = state.registry.list_public(Some(GameType::Uno)).await.len();

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "public_lobbies": {
            "poker": poker_public,
            "uno": uno_public,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
