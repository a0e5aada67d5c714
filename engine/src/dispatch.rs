//! Command envelope validation and routing, per spec.md §4.H.
//!
//! No teacher module centralizes this — the teacher's websocket handler
//! (`net::server`) matches directly on its poker-only `Command` enum and
//! forwards straight to a `TableHandle`. This generalizes that one-game
//! dispatch into a game-type-aware router sitting in front of both
//! lobby kinds, with every path guaranteed to produce an acknowledgement
//! (§4.H: "failure to ack is a protocol bug").

use serde::{Deserialize, Serialize};

use crate::broadcast::LobbySnapshot;
use crate::error::EngineError;
use crate::identity::{GameType, PlayerInfo, UserId};
use crate::lobby::{self, LobbyListing, SharedRegistry};
use crate::lobby::messages::PlayerCommand;
use crate::rewards::RewardsSink;
use crate::session::{ConnectionId, SharedPresence};
use std::sync::Arc;

/// Transport-agnostic command envelope. `game_type` may be inferred by
/// the caller from a connection namespace instead of being present on
/// the wire; it's required here since the engine has no namespace
/// concept of its own.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    ListPublicRooms { game_type: Option<GameType> },
    CreateLobby { game_type: GameType },
    JoinLobby { game_type: GameType, code: String },
    LeaveLobby { game_type: GameType, lobby_code: String },
    StartGame { game_type: GameType, lobby_code: String },
    PlayerAction {
        game_type: GameType,
        lobby_code: String,
        command: PlayerCommand,
    },
    RequestState { game_type: GameType, lobby_code: String },
    EndLobby { game_type: GameType, lobby_code: String },
    PokerRevealCards { lobby_code: String, reveal: bool },
}

/// `{success, accepted?, version?, error?, reason?}`, per spec.md §6.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Ack {
    pub success: bool,
    pub accepted: Option<bool>,
    pub version: Option<u64>,
    pub error: Option<String>,
    pub reason: Option<String>,
    #[serde(skip)]
    pub rooms: Vec<LobbyListing>,
    #[serde(skip)]
    pub snapshot: Option<LobbySnapshot>,
}

impl Ack {
    fn ok(version: u64) -> Self {
        Self {
            success: true,
            accepted: Some(true),
            version: Some(version),
            ..Default::default()
        }
    }

    fn ok_with_snapshot(snapshot: LobbySnapshot) -> Self {
        let version = snapshot.version;
        Self {
            snapshot: Some(snapshot),
            ..Self::ok(version)
        }
    }

    fn err(error: &EngineError) -> Self {
        Self {
            success: false,
            accepted: Some(false),
            error: Some(error.kind().to_string()),
            reason: Some(error.to_string()),
            ..Default::default()
        }
    }
}

pub struct Dispatcher {
    registry: SharedRegistry,
    presence: SharedPresence,
    rewards: Arc<dyn RewardsSink>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: SharedRegistry, presence: SharedPresence, rewards: Arc<dyn RewardsSink>) -> Self {
        Self { registry, presence, rewards }
    }

    pub async fn dispatch(&self, conn_id: ConnectionId, user: &UserId, nickname: &str, command: Command) -> Ack {
        match self.run(conn_id, user, nickname, command).await {
            Ok(ack) => ack,
            Err(err) => Ack::err(&err),
        }
    }

    async fn run(
        &self,
        conn_id: ConnectionId,
        user: &UserId,
        nickname: &str,
        command: Command,
    ) -> Result<Ack, EngineError> {
        match command {
            Command::ListPublicRooms { game_type } => {
                let mut ack = Ack::ok(0);
                ack.rooms = self.registry.list_public(game_type).await;
                Ok(ack)
            }
            Command::CreateLobby { game_type } => {
                if self.presence.has_active(user).await {
                    return Err(EngineError::AlreadyInLobby { user: user.clone() });
                }
                let code = lobby::create_private_lobby(&self.registry, &self.rewards, game_type).await;
                let handle = self.registry.get(game_type, &code).await?;
                self.presence.claim(conn_id, user, game_type, &code).await?;
                let info = PlayerInfo::new(user.clone(), 0, nickname.to_string());
                let snapshot = handle.join(user.clone(), info).await?;
                Ok(Ack::ok_with_snapshot(snapshot))
            }
            Command::JoinLobby { game_type, code } => {
                let handle = self.registry.get(game_type, &code).await?;
                self.presence.claim(conn_id, user, game_type, &code).await?;
                let info = PlayerInfo::new(user.clone(), 0, nickname.to_string());
                let snapshot = handle.join(user.clone(), info).await?;
                Ok(Ack::ok_with_snapshot(snapshot))
            }
            Command::LeaveLobby { game_type, lobby_code } => {
                let handle = self.registry.get(game_type, &lobby_code).await?;
                handle.leave(user.clone()).await?;
                self.presence.release(user).await;
                Ok(Ack::ok(0))
            }
            Command::StartGame { game_type, lobby_code } => {
                let handle = self.registry.get(game_type, &lobby_code).await?;
                handle.start_game(user.clone()).await?;
                let snapshot = handle.get_state(user.clone()).await?;
                Ok(Ack::ok_with_snapshot(snapshot))
            }
            Command::PlayerAction { game_type, lobby_code, command } => {
                let handle = self.registry.get(game_type, &lobby_code).await?;
                handle.player_action(user.clone(), command).await?;
                let snapshot = handle.get_state(user.clone()).await?;
                Ok(Ack::ok_with_snapshot(snapshot))
            }
            Command::RequestState { game_type, lobby_code } => {
                let handle = self.registry.get(game_type, &lobby_code).await?;
                let snapshot = handle.get_state(user.clone()).await?;
                Ok(Ack::ok_with_snapshot(snapshot))
            }
            Command::EndLobby { game_type, lobby_code } => {
                let handle = self.registry.get(game_type, &lobby_code).await?;
                handle.end_lobby(user.clone()).await?;
                self.registry.unregister(game_type, &lobby_code).await;
                Ok(Ack::ok(0))
            }
            Command::PokerRevealCards { lobby_code, reveal } => {
                let handle = self.registry.get(GameType::Poker, &lobby_code).await?;
                handle.reveal_cards(user.clone(), reveal).await?;
                Ok(Ack::ok(0))
            }
        }
    }
}
