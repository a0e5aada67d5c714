//! Opaque user identity and the player-common fields shared by both games.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An authenticated user identity handed to the engine by its caller.
///
/// The engine never authenticates this value, and never inspects its
/// internal representation beyond equality/hashing — the session layer
/// treats it purely as a stable key.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Dense in-lobby seat position, frozen for the duration of a hand/game.
pub type SeatIndex = usize;

/// Which game a lobby is hosting. Used to disambiguate codes and route
/// commands when the envelope doesn't carry an explicit hint.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Poker,
    Uno,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Poker => "poker",
            Self::Uno => "uno",
        };
        write!(f, "{repr}")
    }
}

/// Fields common to every seated player, independent of which game is
/// running. Game-specific state (stack/hole cards for poker, nothing
/// extra for UNO since hands live in a separate per-lobby map) is layered
/// on top by each engine's own player record.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlayerInfo {
    pub user_id: UserId,
    pub seat: SeatIndex,
    pub nickname: String,
    pub avatar: Option<String>,
    pub is_connected: bool,
    pub last_seen: chrono::DateTime<chrono::Utc>,
    pub cosmetics: Vec<String>,
}

impl PlayerInfo {
    #[must_use]
    pub fn new(user_id: UserId, seat: SeatIndex, nickname: String) -> Self {
        Self {
            user_id,
            seat,
            nickname,
            avatar: None,
            is_connected: true,
            last_seen: chrono::Utc::now(),
            cosmetics: Vec::new(),
        }
    }
}
