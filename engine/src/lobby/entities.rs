//! The lobby: common metadata shared by both games, wrapping either a
//! [`PokerState`] or a [`UnoState`].
//!
//! Grounded on the teacher's table metadata (`table::manager::TableMetadata`,
//! the `hand_count`/`is_paused`/`is_closed` fields on `TableActor`) but
//! reshaped around this spec's explicit `Lobby` data model (§3), which
//! names fields the teacher doesn't carry (version counter, action log,
//! celebration descriptor, reward-issued flag).

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::identity::{GameType, PlayerInfo, UserId};
use crate::poker::PokerState;
use crate::uno::UnoState;

/// Action log entries kept past this many are dropped from the tail.
pub const ACTION_LOG_CAPACITY: usize = 200;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyPhase {
    Lobby,
    Playing,
    Finished,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Celebration {
    pub id: String,
    pub winner_id: UserId,
    pub effect_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "gameType", rename_all = "snake_case")]
pub enum GameState {
    Poker(PokerState),
    Uno(UnoState),
}

impl GameState {
    #[must_use]
    pub fn game_type(&self) -> GameType {
        match self {
            Self::Poker(_) => GameType::Poker,
            Self::Uno(_) => GameType::Uno,
        }
    }
}

/// A single lobby: its roster, phase, and the game state it hosts.
///
/// Held behind one [`crate::lobby::actor::LobbyActor`] per lobby so all
/// mutations are linearized (spec.md §5's "serially per lobby" rule) —
/// this struct itself has no internal locking.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Lobby {
    pub code: String,
    pub host: Option<UserId>,
    pub players: Vec<PlayerInfo>,
    pub spectators: Vec<UserId>,
    pub phase: LobbyPhase,
    pub max_players: usize,
    pub is_public: bool,
    pub version: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub action_log: VecDeque<String>,
    pub reward_issued: bool,
    pub celebration: Option<Celebration>,
    pub game: GameState,
    /// Stable ids of one-shot events already delivered, so a reconnecting
    /// viewer never receives a celebration/draw-fx twice.
    #[serde(skip)]
    pub emitted_events: HashSet<String>,
}

impl Lobby {
    #[must_use]
    pub fn new_poker(code: String, is_public: bool, max_players: usize) -> Self {
        let now = chrono::Utc::now();
        Self {
            code,
            host: None,
            players: Vec::new(),
            spectators: Vec::new(),
            phase: LobbyPhase::Lobby,
            max_players,
            is_public,
            version: 0,
            created_at: now,
            updated_at: now,
            action_log: VecDeque::new(),
            reward_issued: false,
            celebration: None,
            game: GameState::Poker(PokerState::new(5, 10)),
            emitted_events: HashSet::new(),
        }
    }

    #[must_use]
    pub fn new_uno(code: String, is_public: bool, max_players: usize) -> Self {
        let now = chrono::Utc::now();
        Self {
            code,
            host: None,
            players: Vec::new(),
            spectators: Vec::new(),
            phase: LobbyPhase::Lobby,
            max_players,
            is_public,
            version: 0,
            created_at: now,
            updated_at: now,
            action_log: VecDeque::new(),
            reward_issued: false,
            celebration: None,
            game: GameState::Uno(UnoState::default()),
            emitted_events: HashSet::new(),
        }
    }

    pub fn bump_version(&mut self) {
        self.version += 1;
        self.updated_at = chrono::Utc::now();
    }

    pub fn push_log(&mut self, entry: impl Into<String>) {
        self.action_log.push_back(entry.into());
        while self.action_log.len() > ACTION_LOG_CAPACITY {
            self.action_log.pop_front();
        }
    }

    /// Resets a public lobby to empty `lobby` phase with a fresh version,
    /// per spec.md's public-lobby-reset lifecycle rule. Private lobbies
    /// are never reset this way — the registry deletes them instead.
    pub fn reset_public(&mut self) {
        let game_type = self.game.game_type();
        self.host = None;
        self.players.clear();
        self.spectators.clear();
        self.phase = LobbyPhase::Lobby;
        self.reward_issued = false;
        self.celebration = None;
        self.emitted_events.clear();
        self.game = match game_type {
            GameType::Poker => GameState::Poker(PokerState::new(5, 10)),
            GameType::Uno => GameState::Uno(UnoState::default()),
        };
        self.bump_version();
    }
}
