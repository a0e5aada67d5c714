//! Lobby actor message types.
//!
//! Grounded on the teacher's `table::messages::TableMessage` — a flat
//! message enum, one variant per command, each carrying a
//! `oneshot::Sender` for its reply — generalized to cover both games'
//! actions through one [`PlayerCommand`] union instead of the teacher's
//! poker-only `Action`.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::broadcast::LobbySnapshot;
use crate::cards::uno::{CardId, Color};
use crate::error::EngineResult;
use crate::identity::{PlayerInfo, UserId};
use crate::poker::{PokerAction, Usd};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlayerCommand {
    Poker {
        action: PokerAction,
        amount: Option<Usd>,
    },
    UnoPlay {
        card_id: CardId,
        chosen_color: Option<Color>,
    },
    UnoDraw,
    UnoPass,
    UnoCallUno,
    UnoCatchUno,
}

#[derive(Debug)]
pub struct PeekSnapshot {
    pub player_count: usize,
    pub status: String,
    pub max_players: usize,
}

#[derive(Debug)]
pub enum LobbyMessage {
    Join {
        user: UserId,
        info: PlayerInfo,
        response: oneshot::Sender<EngineResult<LobbySnapshot>>,
    },
    Leave {
        user: UserId,
        response: oneshot::Sender<EngineResult<()>>,
    },
    StartGame {
        user: UserId,
        response: oneshot::Sender<EngineResult<()>>,
    },
    PlayerAction {
        user: UserId,
        command: PlayerCommand,
        response: oneshot::Sender<EngineResult<()>>,
    },
    GetState {
        user: UserId,
        response: oneshot::Sender<EngineResult<LobbySnapshot>>,
    },
    EndLobby {
        user: UserId,
        response: oneshot::Sender<EngineResult<()>>,
    },
    RevealCards {
        user: UserId,
        reveal: bool,
        response: oneshot::Sender<EngineResult<()>>,
    },
    Subscribe {
        user: UserId,
        sender: tokio::sync::mpsc::Sender<LobbySnapshot>,
    },
    Disconnect {
        user: UserId,
        response: oneshot::Sender<EngineResult<()>>,
    },
    Peek {
        response: oneshot::Sender<EngineResult<PeekSnapshot>>,
    },
    Tick,
}
