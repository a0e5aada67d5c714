//! Code allocation and lobby bookkeeping, shared across both game types.
//!
//! Grounded on the teacher's `TableManager` (`tables: Arc<RwLock<HashMap<...>>>`,
//! spawn-actor-and-store-handle pattern) but with a single registry
//! covering both poker and UNO codes, per spec.md §4.E's "checking against
//! both the UNO and Poker registries to prevent collisions."

use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use crate::error::{EngineError, EngineResult};
use crate::identity::GameType;
use crate::lobby::actor::LobbyHandle;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;

#[must_use]
pub fn public_codes(game_type: GameType) -> [&'static str; 3] {
    match game_type {
        GameType::Poker => ["POKER_PUBLIC_1", "POKER_PUBLIC_2", "POKER_PUBLIC_3"],
        GameType::Uno => ["UNO_PUBLIC_1", "UNO_PUBLIC_2", "UNO_PUBLIC_3"],
    }
}

#[derive(Clone)]
pub struct LobbyListing {
    pub game_type: GameType,
    pub code: String,
    pub player_count: usize,
    pub status: String,
    pub max_players: usize,
}

/// Registers every live lobby (public and private, both game types) so
/// codes are generated without collision and so callers can look up a
/// handle by `(gameType, code)`.
pub struct LobbyRegistry {
    lobbies: RwLock<HashMap<(GameType, String), LobbyHandle>>,
}

impl LobbyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lobbies: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, game_type: GameType, code: String, handle: LobbyHandle) {
        self.lobbies.write().await.insert((game_type, code), handle);
    }

    pub async fn unregister(&self, game_type: GameType, code: &str) {
        self.lobbies.write().await.remove(&(game_type, code.to_string()));
    }

    pub async fn get(&self, game_type: GameType, code: &str) -> EngineResult<LobbyHandle> {
        self.lobbies
            .read()
            .await
            .get(&(game_type, code.to_string()))
            .cloned()
            .ok_or(EngineError::NotFound)
    }

    pub async fn contains(&self, game_type: GameType, code: &str) -> bool {
        self.lobbies.read().await.contains_key(&(game_type, code.to_string()))
    }

    /// Generates a fresh 6-character code, retrying on collision against
    /// every registered code of either game type.
    pub async fn allocate_code(&self) -> String {
        let lobbies = self.lobbies.read().await;
        let mut rng = rand::rng();
        loop {
            let candidate: String = (0..CODE_LEN)
                .map(|_| *CODE_ALPHABET.choose(&mut rng).expect("alphabet is non-empty") as char)
                .collect();
            let collides = lobbies
                .keys()
                .any(|(_, code)| code == &candidate);
            if !collides {
                return candidate;
            }
        }
    }

    pub async fn list_public(&self, filter: Option<GameType>) -> Vec<LobbyListing> {
        let lobbies = self.lobbies.read().await;
        let mut out = Vec::new();
        for ((game_type, code), handle) in lobbies.iter() {
            if let Some(want) = filter {
                if *game_type != want {
                    continue;
                }
            }
            if !is_public_code(*game_type, code) {
                continue;
            }
            if let Ok(snapshot) = handle.peek().await {
                out.push(LobbyListing {
                    game_type: *game_type,
                    code: code.clone(),
                    player_count: snapshot.player_count,
                    status: snapshot.status,
                    max_players: snapshot.max_players,
                });
            }
        }
        out
    }
}

impl Default for LobbyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn is_public_code(game_type: GameType, code: &str) -> bool {
    public_codes(game_type).contains(&code)
}

pub type SharedRegistry = Arc<LobbyRegistry>;
