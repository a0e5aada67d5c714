//! Lobby lifecycle: registry (code allocation), per-lobby actor, and the
//! message protocol between them.

pub mod actor;
pub mod entities;
pub mod messages;
pub mod registry;

pub use actor::{LobbyActor, LobbyHandle};
pub use entities::{GameState, Lobby, LobbyPhase};
pub use registry::{LobbyListing, LobbyRegistry, SharedRegistry};

use std::sync::Arc;

use crate::identity::GameType;
use crate::rewards::RewardsSink;

/// Default capacity for a freshly created lobby; poker and UNO share one
/// number since neither game imposes a tighter seat cap in this spec.
pub const DEFAULT_MAX_PLAYERS: usize = 8;

/// Creates and registers the six reserved public lobbies (three poker,
/// three UNO) at startup. Public lobbies are never deleted, only reset,
/// per spec.md §4.E.
pub async fn bootstrap_public_lobbies(registry: &SharedRegistry, rewards: &Arc<dyn RewardsSink>) {
    for code in registry::public_codes(GameType::Poker) {
        let lobby = Lobby::new_poker(code.to_string(), true, DEFAULT_MAX_PLAYERS);
        let handle = LobbyActor::spawn(lobby, rewards.clone(), Arc::clone(registry));
        registry.register(GameType::Poker, code.to_string(), handle).await;
    }
    for code in registry::public_codes(GameType::Uno) {
        let lobby = Lobby::new_uno(code.to_string(), true, DEFAULT_MAX_PLAYERS);
        let handle = LobbyActor::spawn(lobby, rewards.clone(), Arc::clone(registry));
        registry.register(GameType::Uno, code.to_string(), handle).await;
    }
}

/// Creates a private lobby with a freshly allocated code and registers it.
/// Returns the code so the caller can relay it to the host.
pub async fn create_private_lobby(
    registry: &SharedRegistry,
    rewards: &Arc<dyn RewardsSink>,
    game_type: GameType,
) -> String {
    let code = registry.allocate_code().await;
    let lobby = match game_type {
        GameType::Poker => Lobby::new_poker(code.clone(), false, DEFAULT_MAX_PLAYERS),
        GameType::Uno => Lobby::new_uno(code.clone(), false, DEFAULT_MAX_PLAYERS),
    };
    let handle = LobbyActor::spawn(lobby, rewards.clone(), Arc::clone(registry));
    registry.register(game_type, code.clone(), handle).await;
    code
}
