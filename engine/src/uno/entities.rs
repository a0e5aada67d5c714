//! UNO-specific player and prompt state.

use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// The randomized "catch me" button coordinates shown to every viewer
/// once `mustCallUno` is set, so all clients render an identical target.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UnoPrompt {
    pub target_player: UserId,
    pub button_x: u32,
    pub button_y: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A card drawn by a player that turned out to be playable: the turn
/// stays with them until they `play` it or `pass`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DrawnPlayable {
    pub player: UserId,
    pub card: crate::cards::uno::CardId,
}
