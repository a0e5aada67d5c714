//! Poker-specific player and pot state.
//!
//! `Pot` is a direct generalization of the teacher's `game::entities::Pot`
//! (same `HashMap<SeatIndex, Usd>` investment ledger and the same
//! `get_call`/`get_call_by_player_idx`/`get_min_raise_by_player_idx`/
//! `get_size` contract) — only the side-pot *construction* at all-in
//! boundaries is new, per spec.md §4.D and the Open Question in §9
//! favoring the canonical algorithm over the source's simplified one.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::cards::poker::Card;
use crate::identity::{PlayerInfo, SeatIndex};

/// Whole-dollar chip amount. Matches the teacher's `Usd = u32` — there's
/// no fractional chip in this system.
pub type Usd = u32;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PokerAction {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

impl std::fmt::Display for PokerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let repr = match self {
            Self::Fold => "fold",
            Self::Check => "check",
            Self::Call => "call",
            Self::Bet => "bet",
            Self::Raise => "raise",
            Self::AllIn => "all-in",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PokerPlayer {
    pub info: PlayerInfo,
    pub stack: Usd,
    pub current_bet: Usd,
    pub hole_cards: Option<[Card; 2]>,
    pub folded: bool,
    pub all_in: bool,
    pub last_action: Option<PokerAction>,
    pub last_bet: Usd,
    pub cards_revealed: bool,
}

impl PokerPlayer {
    #[must_use]
    pub fn new(info: PlayerInfo, stack: Usd) -> Self {
        Self {
            info,
            stack,
            current_bet: 0,
            hole_cards: None,
            folded: false,
            all_in: false,
            last_action: None,
            last_bet: 0,
            cards_revealed: false,
        }
    }

    #[must_use]
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    pub fn reset_for_street(&mut self) {
        self.current_bet = 0;
    }

    pub fn reset_for_hand(&mut self) {
        self.current_bet = 0;
        self.hole_cards = None;
        self.folded = false;
        self.all_in = false;
        self.last_action = None;
        self.last_bet = 0;
        self.cards_revealed = false;
    }
}

/// Accumulates each seated player's total investment across the whole
/// hand, the same shape as the teacher's `Pot`. Side pots are carved out
/// of this ledger at showdown by [`crate::poker::engine::build_side_pots`]
/// rather than being tracked incrementally — simpler to reason about and
/// still O(players) per hand.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Pot {
    pub investments: HashMap<SeatIndex, Usd>,
}

impl Pot {
    pub fn commit(&mut self, seat: SeatIndex, amount: Usd) {
        *self.investments.entry(seat).or_default() += amount;
    }

    #[must_use]
    pub fn get_call(&self) -> Usd {
        *self.investments.values().max().unwrap_or(&0)
    }

    #[must_use]
    pub fn get_investment_by_seat(&self, seat: SeatIndex) -> Usd {
        *self.investments.get(&seat).unwrap_or(&0)
    }

    #[must_use]
    pub fn get_call_by_seat(&self, seat: SeatIndex) -> Usd {
        self.get_call() - self.get_investment_by_seat(seat)
    }

    #[must_use]
    pub fn get_min_raise_by_seat(&self, seat: SeatIndex, last_raise: Usd) -> Usd {
        self.get_call() + last_raise - self.get_investment_by_seat(seat)
    }

    #[must_use]
    pub fn get_size(&self) -> Usd {
        self.investments.values().sum()
    }
}

/// A resolved side (or main) pot, with the set of seats eligible to win
/// it. Built once at showdown from the hand-long [`Pot`] ledger.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SidePot {
    pub amount: Usd,
    pub eligible: HashSet<SeatIndex>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Preflop => Some(Self::Flop),
            Self::Flop => Some(Self::Turn),
            Self::Turn => Some(Self::River),
            Self::River => Some(Self::Showdown),
            Self::Showdown => None,
        }
    }
}

impl std::fmt::Display for Street {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let repr = match self {
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pot_call_and_min_raise_track_investments() {
        let mut pot = Pot::default();
        pot.commit(0, 10);
        pot.commit(1, 20);
        assert_eq!(pot.get_call(), 20);
        assert_eq!(pot.get_call_by_seat(0), 10);
        assert_eq!(pot.get_min_raise_by_seat(0, 20), 30);
        assert_eq!(pot.get_size(), 30);
    }
}
