//! Per-viewer snapshot projection and one-shot event dedupe.
//!
//! No teacher module builds a redacted per-viewer view (the teacher sends
//! a single `GameView` keyed by `user_id` computed inline in
//! `table::actor::get_game_view`); this generalizes that one entry point
//! into a projection applied after every mutation, per spec.md §4.G.

use serde::Serialize;

use crate::cards::poker::Card as PokerCard;
use crate::cards::uno::Card as UnoCard;
use crate::identity::{GameType, PlayerInfo, SeatIndex, UserId};
use crate::lobby::entities::{Celebration, GameState, Lobby, LobbyPhase};
use crate::poker::{PokerAction, Pot, Street};
use crate::uno::{DrawnPlayable, UnoPrompt};

#[derive(Clone, Debug, Serialize)]
pub struct PokerPlayerView {
    pub user_id: UserId,
    pub nickname: String,
    pub seat: SeatIndex,
    pub is_connected: bool,
    pub stack: u32,
    pub current_bet: u32,
    pub folded: bool,
    pub all_in: bool,
    pub last_action: Option<PokerAction>,
    /// `Some` only for the viewer's own seat, or for any non-folded seat
    /// once the hand has reached showdown.
    pub hole_cards: Option<[PokerCard; 2]>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PokerView {
    pub players: Vec<PokerPlayerView>,
    pub community: Vec<PokerCard>,
    pub pot_size: u32,
    pub current_bet: u32,
    pub dealer_idx: SeatIndex,
    pub current_player_idx: Option<SeatIndex>,
    pub street: Street,
    pub small_blind: u32,
    pub big_blind: u32,
    pub hand_number: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnoPlayerView {
    pub user_id: UserId,
    pub nickname: String,
    pub seat: SeatIndex,
    pub is_connected: bool,
    pub hand_count: usize,
    /// `Some` only for the viewer's own hand.
    pub hand: Option<Vec<UnoCard>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnoView {
    pub players: Vec<UnoPlayerView>,
    pub discard_top: Option<UnoCard>,
    pub draw_pile_count: usize,
    pub current_color: Option<crate::cards::uno::Color>,
    pub direction: i8,
    pub current_player_idx: Option<SeatIndex>,
    pub must_call_uno: Option<UserId>,
    pub prompt: Option<UnoPrompt>,
    pub drawn_playable: Option<DrawnPlayable>,
    pub winner: Option<UserId>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "gameType", rename_all = "snake_case")]
pub enum GameView {
    Poker(PokerView),
    Uno(UnoView),
}

/// The full per-viewer payload pushed on every mutation. `version` lets a
/// client discard a snapshot that arrives out of order.
#[derive(Clone, Debug, Serialize)]
pub struct LobbySnapshot {
    pub code: String,
    pub host: Option<UserId>,
    pub players: Vec<PlayerInfo>,
    pub spectator_count: usize,
    pub phase: LobbyPhase,
    pub max_players: usize,
    pub is_public: bool,
    pub version: u64,
    pub celebration: Option<Celebration>,
    pub game: GameView,
}

fn project_poker(lobby: &Lobby, viewer: &UserId, state: &crate::poker::PokerState) -> PokerView {
    let reveal_all = matches!(state.street, Street::Showdown);
    let players = state
        .players
        .iter()
        .map(|p| {
            let is_viewer = p.info.user_id == *viewer;
            let hole_cards = if is_viewer || (reveal_all && !p.folded) {
                p.hole_cards
            } else {
                None
            };
            PokerPlayerView {
                user_id: p.info.user_id.clone(),
                nickname: p.info.nickname.clone(),
                seat: p.info.seat,
                is_connected: p.info.is_connected,
                stack: p.stack,
                current_bet: p.current_bet,
                folded: p.folded,
                all_in: p.all_in,
                last_action: p.last_action,
                hole_cards,
            }
        })
        .collect();
    let _ = lobby;
    PokerView {
        players,
        community: state.community.clone(),
        pot_size: pot_size(&state.pot),
        current_bet: state.current_bet,
        dealer_idx: state.dealer_idx,
        current_player_idx: state.current_player_idx,
        street: state.street,
        small_blind: state.small_blind,
        big_blind: state.big_blind,
        hand_number: state.hand_number,
    }
}

fn pot_size(pot: &Pot) -> u32 {
    pot.get_size()
}

fn project_uno(viewer: &UserId, state: &crate::uno::UnoState) -> UnoView {
    let players = state
        .players
        .iter()
        .map(|p| {
            let hand = state.hands.get(&p.user_id).cloned().unwrap_or_default();
            let is_viewer = p.user_id == *viewer;
            UnoPlayerView {
                user_id: p.user_id.clone(),
                nickname: p.nickname.clone(),
                seat: p.seat,
                is_connected: p.is_connected,
                hand_count: hand.len(),
                hand: is_viewer.then_some(hand),
            }
        })
        .collect();
    UnoView {
        players,
        discard_top: state.discard_pile.last().copied(),
        draw_pile_count: state.draw_pile.len(),
        current_color: state.current_color,
        direction: state.direction,
        current_player_idx: state.current_player_idx,
        must_call_uno: state.must_call_uno.clone(),
        prompt: state.prompt.clone(),
        drawn_playable: state.drawn_playable.clone(),
        winner: state.winner.clone(),
    }
}

/// Builds the snapshot a single `viewer` is allowed to see of `lobby`.
#[must_use]
pub fn project(lobby: &Lobby, viewer: &UserId) -> LobbySnapshot {
    let game = match &lobby.game {
        GameState::Poker(state) => GameView::Poker(project_poker(lobby, viewer, state)),
        GameState::Uno(state) => GameView::Uno(project_uno(viewer, state)),
    };
    LobbySnapshot {
        code: lobby.code.clone(),
        host: lobby.host.clone(),
        players: lobby.players.clone(),
        spectator_count: lobby.spectators.len(),
        phase: lobby.phase,
        max_players: lobby.max_players,
        is_public: lobby.is_public,
        version: lobby.version,
        celebration: lobby.celebration.clone(),
        game,
    }
}

/// Returns `true` and records the id the first time `event_id` is seen
/// for this lobby; returns `false` on every subsequent call, so a
/// celebration/draw-fx event is delivered exactly once across the
/// lobby's lifetime, per spec.md §4.G.
pub fn should_emit(lobby: &mut Lobby, event_id: &str) -> bool {
    lobby.emitted_events.insert(event_id.to_string())
}
