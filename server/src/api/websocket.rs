//! WebSocket handler for real-time lobby communication.
//!
//! This module implements a bidirectional WebSocket connection carrying
//! the engine's `Command`/`Ack` envelope. Every command gets an immediate
//! `ack`; a command that leaves the connection seated in a lobby also
//! subscribes it to that lobby actor's push channel, so every subsequent
//! mutation by any player at the table arrives as a `state` message
//! without the connection having to poll — mirroring the teacher's
//! "game view every ~1s" push loop, but driven by the actor's own
//! `Subscribe` mechanism instead of a timer.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws?user_id=<id>&nickname=<name>`
//! 2. Server assigns a connection id and establishes the WebSocket
//! 3. Incoming `Command` envelopes are dispatched one at a time; a
//!    successful join/create/start/action/request re-subscribes this
//!    connection to the relevant lobby's push channel
//! 4. On disconnect, a reconnect grace timer is armed via
//!    `PresenceRegistry::disconnect`
//!
//! # Client Messages
//!
//! Clients send JSON-encoded `tablehall::dispatch::Command` values.
//!
//! # Server Messages
//!
//! - `{"type": "ack", ...}` - response to the command just processed
//! - `{"type": "state", "snapshot": ...}` - a fresh per-viewer snapshot
//! - `{"type": "rooms", "rooms": [...]}` - public lobby listing

use std::future::pending;
use std::sync::atomic::Ordering;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tablehall::broadcast::LobbySnapshot;
use tablehall::dispatch::{Ack, Command};
use tablehall::identity::{GameType, UserId};

use super::AppState;
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    user_id: String,
    #[serde(default = "default_nickname")]
    nickname: String,
}

fn default_nickname() -> String {
    "Guest".to_string()
}

/// Upgrade an HTTP connection to a WebSocket carrying the command protocol.
///
/// # Query Parameters
///
/// - `user_id`: the caller-supplied identity for this session
/// - `nickname`: optional display name, defaults to `"Guest"`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let conn_id = state.conn_seq.fetch_add(1, Ordering::Relaxed);
    let user = UserId::new(query.user_id);
    ws.on_upgrade(move |socket| handle_socket(socket, conn_id, user, query.nickname, state))
}

/// Which lobby a command targets, for subscription purposes. `ListPublicRooms`
/// targets none; `PokerRevealCards` is always poker.
fn command_game_type(command: &Command) -> Option<GameType> {
    match command {
        Command::ListPublicRooms { .. } => None,
        Command::CreateLobby { game_type }
        | Command::JoinLobby { game_type, .. }
        | Command::LeaveLobby { game_type, .. }
        | Command::StartGame { game_type, .. }
        | Command::PlayerAction { game_type, .. }
        | Command::RequestState { game_type, .. }
        | Command::EndLobby { game_type, .. } => Some(*game_type),
        Command::PokerRevealCards { .. } => Some(GameType::Poker),
    }
}

fn is_departure(command: &Command) -> bool {
    matches!(command, Command::LeaveLobby { .. } | Command::EndLobby { .. })
}

/// Drives one established WebSocket connection end to end.
async fn handle_socket(socket: WebSocket, conn_id: u64, user: UserId, nickname: String, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    state.active_connections.fetch_add(1, Ordering::Relaxed);
    metrics::websocket_connections_active(state.active_connections.load(Ordering::Relaxed));
    metrics::websocket_connections_total();
    tracing::info!(conn_id, user_id = %user, "websocket connected");

    let mut snapshot_rx: Option<mpsc::Receiver<LobbySnapshot>> = None;

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        metrics::websocket_messages_received();
                        let started = std::time::Instant::now();

                        let payloads = match serde_json::from_str::<Command>(&text) {
                            Ok(command) => {
                                let ack = state.dispatcher.dispatch(conn_id, &user, &nickname, command.clone()).await;

                                if ack.success && is_departure(&command) {
                                    snapshot_rx = None;
                                } else if ack.success {
                                    if let (Some(game_type), Some(snapshot)) = (command_game_type(&command), &ack.snapshot)
                                        && let Ok(handle) = state.registry.get(game_type, &snapshot.code).await
                                    {
                                        let (tx, rx) = mpsc::channel(8);
                                        if handle.subscribe(user.clone(), tx).await.is_ok() {
                                            snapshot_rx = Some(rx);
                                        }
                                    }
                                }

                                logging::log_command("player_action", ack.success, started.elapsed().as_millis() as u64, Some(&user.0));
                                ack_payloads(&ack)
                            }
                            Err(err) => vec![json!({
                                "type": "ack",
                                "success": false,
                                "error": "invalid_command",
                                "reason": err.to_string(),
                            })],
                        };

                        for payload in payloads {
                            if send(&mut sender, &payload).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(conn_id, user_id = %user, "websocket closed by client");
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::warn!(conn_id, user_id = %user, error = %err, "websocket error");
                        break;
                    }
                    _ => {}
                }
            }
            snapshot = next_snapshot(&mut snapshot_rx) => {
                match snapshot {
                    Some(snapshot) => {
                        let _ = send(&mut sender, &json!({"type": "state", "snapshot": snapshot})).await;
                    }
                    None => snapshot_rx = None,
                }
            }
        }
    }

    state.presence.disconnect(state.registry.clone(), conn_id);

    state.active_connections.fetch_add(-1, Ordering::Relaxed);
    metrics::websocket_connections_active(state.active_connections.load(Ordering::Relaxed));
    tracing::info!(conn_id, user_id = %user, "websocket disconnected");
}

/// Awaits the next push on `rx` if subscribed, otherwise never resolves —
/// letting `tokio::select!` treat "not currently subscribed" as an idle
/// branch rather than special-casing it at every call site.
async fn next_snapshot(rx: &mut Option<mpsc::Receiver<LobbySnapshot>>) -> Option<LobbySnapshot> {
    match rx {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}

async fn send(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    payload: &Value,
) -> Result<(), axum::Error> {
    let result = sender.send(Message::Text(payload.to_string().into())).await;
    if result.is_ok() {
        metrics::websocket_messages_sent();
    }
    result
}

/// Splits one `Ack` into the wire messages it implies: the ack itself,
/// plus the out-of-band `rooms`/`state` pushes its skipped fields carry.
fn ack_payloads(ack: &Ack) -> Vec<Value> {
    let mut out = vec![serde_json::to_value(AckWire::from(ack)).unwrap_or(json!({"type": "ack"}))];
    if let Some(snapshot) = &ack.snapshot {
        out.push(json!({"type": "state", "snapshot": snapshot}));
    }
    if !ack.rooms.is_empty() {
        let rooms: Vec<Value> = ack
            .rooms
            .iter()
            .map(|r| {
                json!({
                    "gameType": r.game_type,
                    "code": r.code,
                    "playerCount": r.player_count,
                    "status": r.status,
                    "maxPlayers": r.max_players,
                })
            })
            .collect();
        out.push(json!({"type": "rooms", "rooms": rooms}));
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AckWire {
    #[serde(rename = "type")]
    kind: &'static str,
    success: bool,
    accepted: Option<bool>,
    version: Option<u64>,
    error: Option<String>,
    reason: Option<String>,
}

impl From<&Ack> for AckWire {
    fn from(ack: &Ack) -> Self {
        Self {
            kind: "ack",
            success: ack.success,
            accepted: ack.accepted,
            version: ack.version,
            error: ack.error.clone(),
            reason: ack.reason.clone(),
        }
    }
}
