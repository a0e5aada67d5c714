//! Per-lobby UNO state machine: playability, actions, effects, reshuffle,
//! and the UNO-call mandate.
//!
//! No UNO reference implementation exists anywhere in the retrieval pack
//! this was built against; this module follows the teacher's general
//! entity/state-machine idiom (plain structs, explicit match-driven
//! transitions, `thiserror`-style error returns via [`crate::error`])
//! rather than any specific UNO source file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cards::uno::{self, Card, CardId, CardIdAllocator, Color, Face};
use crate::error::{EngineError, EngineResult};
use crate::identity::{PlayerInfo, SeatIndex, UserId};
use crate::rng::{gen_button_pos, TableRng};
use crate::uno::entities::{DrawnPlayable, UnoPrompt};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UnoState {
    pub players: Vec<PlayerInfo>,
    pub hands: HashMap<UserId, Vec<Card>>,
    pub draw_pile: Vec<Card>,
    pub discard_pile: Vec<Card>,
    pub current_color: Option<Color>,
    pub direction: i8,
    pub current_player_idx: Option<SeatIndex>,
    pub dealer_idx: SeatIndex,
    pub drawn_playable: Option<DrawnPlayable>,
    pub must_call_uno: Option<UserId>,
    pub prompt: Option<UnoPrompt>,
    pub winner: Option<UserId>,
    pub card_alloc: CardIdAllocator,
}

impl Default for UnoState {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            hands: HashMap::new(),
            draw_pile: Vec::new(),
            discard_pile: Vec::new(),
            current_color: None,
            direction: 1,
            current_player_idx: None,
            dealer_idx: 0,
            drawn_playable: None,
            must_call_uno: None,
            prompt: None,
            winner: None,
            card_alloc: CardIdAllocator::default(),
        }
    }
}

/// A card is playable on `top`/`current_color` iff it's a Wild/Wild4, or
/// its color matches, or it shares an action/number kind with `top`, per
/// spec.md §4.C. Wild4's additional restriction is checked separately by
/// callers since it needs the acting player's whole hand.
fn is_basic_playable(face: Face, top: Face, current_color: Color) -> bool {
    if face.is_wild() {
        return true;
    }
    if face.color() == Some(current_color) {
        return true;
    }
    matches!(
        (top, face),
        (Face::Number { value: a, .. }, Face::Number { value: b, .. }) if a == b
    ) || matches!((top, face), (Face::Skip { .. }, Face::Skip { .. }))
        || matches!((top, face), (Face::Reverse { .. }, Face::Reverse { .. }))
        || matches!((top, face), (Face::Draw2 { .. }, Face::Draw2 { .. }))
}

fn can_play_wild4(hand: &[Card], current_color: Color) -> bool {
    !hand.iter().any(|c| c.face.color() == Some(current_color))
}

fn is_legal_play(face: Face, top: Face, current_color: Color, hand: &[Card]) -> bool {
    if !is_basic_playable(face, top, current_color) {
        return false;
    }
    if matches!(face, Face::Wild4) {
        return can_play_wild4(hand, current_color);
    }
    true
}

fn has_any_playable(hand: &[Card], top: Face, current_color: Color) -> bool {
    hand.iter()
        .any(|c| is_legal_play(c.face, top, current_color, hand))
}

impl UnoState {
    fn seat_of(&self, user: &UserId) -> EngineResult<SeatIndex> {
        self.players
            .iter()
            .position(|p| &p.user_id == user)
            .ok_or(EngineError::NotFound)
    }

    fn require_current_player(&self, user: &UserId) -> EngineResult<SeatIndex> {
        let seat = self.seat_of(user)?;
        match self.current_player_idx {
            Some(cur) if cur == seat => Ok(seat),
            Some(cur) => Err(EngineError::NotYourTurn {
                expected: self.players[cur].user_id.clone(),
            }),
            None => Err(EngineError::phase_violation("playing", "finished")),
        }
    }

    fn top_card(&self) -> EngineResult<Card> {
        self.discard_pile.last().copied().ok_or(EngineError::Internal {
            reason: "discard pile is empty".to_string(),
        })
    }

    /// Clears a stale mandate at the start of the obligated player's own
    /// next turn action — the window to catch them has passed by the
    /// time they act again without being caught.
    fn clear_own_mandate(&mut self, user: &UserId) {
        if self.must_call_uno.as_ref() == Some(user) {
            self.must_call_uno = None;
            self.prompt = None;
        }
    }

    fn seat_offset(&self, from: SeatIndex, steps: i32) -> SeatIndex {
        let n = self.players.len() as i32;
        let dir = i32::from(self.direction);
        (((from as i32) + dir * steps).rem_euclid(n)) as usize
    }

    fn draw_cards(&mut self, user: &UserId, count: u32, rng: &mut dyn TableRng) -> Vec<Card> {
        let mut drawn = Vec::new();
        for _ in 0..count {
            if self.draw_pile.is_empty() {
                self.reshuffle_discard_into_draw(rng);
            }
            match self.draw_pile.pop() {
                Some(card) => drawn.push(card),
                None => break,
            }
        }
        self.hands.entry(user.clone()).or_default().extend(drawn.iter().copied());
        drawn
    }

    /// Discard's top is retained; the rest is shuffled into a fresh draw
    /// pile, per spec.md §4.C's reshuffle policy.
    fn reshuffle_discard_into_draw(&mut self, rng: &mut dyn TableRng) {
        if self.discard_pile.len() <= 1 {
            return;
        }
        let top = self.discard_pile.pop().expect("non-empty discard");
        let mut rest = std::mem::take(&mut self.discard_pile);
        uno::shuffle(&mut rest, rng);
        self.draw_pile = rest;
        self.discard_pile = vec![top];
    }

    fn apply_effect(&mut self, actor_seat: SeatIndex, face: Face, rng: &mut dyn TableRng) {
        let n = self.players.len();
        match face {
            Face::Skip { .. } => {
                self.current_player_idx = Some(self.seat_offset(actor_seat, 2));
            }
            Face::Reverse { .. } => {
                self.direction = -self.direction;
                self.current_player_idx = Some(if n == 2 {
                    actor_seat
                } else {
                    self.seat_offset(actor_seat, 1)
                });
            }
            Face::Draw2 { .. } => {
                let victim_seat = self.seat_offset(actor_seat, 1);
                let victim = self.players[victim_seat].user_id.clone();
                self.draw_cards(&victim, 2, rng);
                self.current_player_idx = Some(self.seat_offset(actor_seat, 2));
            }
            Face::Wild4 => {
                let victim_seat = self.seat_offset(actor_seat, 1);
                let victim = self.players[victim_seat].user_id.clone();
                self.draw_cards(&victim, 4, rng);
                self.current_player_idx = Some(self.seat_offset(actor_seat, 2));
            }
            Face::Number { .. } | Face::Wild => {
                self.current_player_idx = Some(self.seat_offset(actor_seat, 1));
            }
        }
    }

    /// Deal seven cards to each seated player, pick a starting discard
    /// (reshuffling a Wild/Wild4 back in, bounded retries), and apply its
    /// effect as if played by the dealer toward the first actor.
    pub fn start_game(&mut self, roster: Vec<PlayerInfo>, rng: &mut dyn TableRng) -> EngineResult<()> {
        if roster.len() < 2 {
            return Err(EngineError::invalid_action("need at least 2 connected players"));
        }
        let n = roster.len();
        self.players = roster
            .into_iter()
            .enumerate()
            .map(|(seat, mut info)| {
                info.seat = seat;
                info
            })
            .collect();
        self.hands.clear();
        self.direction = 1;
        self.winner = None;
        self.drawn_playable = None;
        self.must_call_uno = None;
        self.prompt = None;
        self.dealer_idx = (self.dealer_idx + 1) % n;

        let mut deck = uno::fresh_deck(&mut self.card_alloc);
        uno::shuffle(&mut deck, rng);

        for _ in 0..7 {
            for info in self.players.clone() {
                let card = deck.pop().expect("108-card deck covers any seated roster");
                self.hands.entry(info.user_id).or_default().push(card);
            }
        }

        let mut starter = None;
        for _ in 0..20 {
            let Some(card) = deck.pop() else { break };
            if card.face.is_wild() {
                deck.insert(0, card);
                uno::shuffle(&mut deck, rng);
                continue;
            }
            starter = Some(card);
            break;
        }
        let starter = starter.ok_or_else(|| EngineError::Internal {
            reason: "could not draw a non-wild starting card".to_string(),
        })?;

        self.draw_pile = deck;
        self.discard_pile = vec![starter];
        self.current_color = starter.face.color();

        let first_actor = (self.dealer_idx + 1) % n;
        self.current_player_idx = Some(first_actor);
        self.apply_effect(self.dealer_idx, starter.face, rng);
        Ok(())
    }

    pub fn play(
        &mut self,
        user: &UserId,
        card_id: CardId,
        chosen_color: Option<Color>,
        rng: &mut dyn TableRng,
    ) -> EngineResult<()> {
        let seat = self.require_current_player(user)?;
        self.clear_own_mandate(user);

        let hand = self.hands.get(user).ok_or(EngineError::NotFound)?;
        let idx = hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or_else(|| EngineError::invalid_action("card not in hand"))?;
        let card = hand[idx];
        let top = self.top_card()?;
        let current_color = self.current_color.ok_or(EngineError::Internal {
            reason: "no current color set".to_string(),
        })?;

        if !is_legal_play(card.face, top.face, current_color, hand) {
            return Err(EngineError::invalid_action("card is not playable"));
        }
        if card.face.is_wild() && chosen_color.is_none() {
            return Err(EngineError::invalid_action("wild cards require a chosen color"));
        }

        let hand = self.hands.get_mut(user).expect("checked above");
        hand.remove(idx);
        self.discard_pile.push(card);
        self.current_color = Some(match card.face {
            Face::Wild | Face::Wild4 => chosen_color.expect("checked above"),
            other => other.color().expect("non-wild face always has a color"),
        });
        self.drawn_playable = None;

        self.apply_effect(seat, card.face, rng);

        let remaining = self.hands.get(user).map_or(0, Vec::len);
        if remaining == 0 {
            self.winner = Some(user.clone());
            self.current_player_idx = None;
        } else if remaining == 1 {
            self.must_call_uno = Some(user.clone());
            let (x, y) = gen_button_pos(rng);
            self.prompt = Some(UnoPrompt {
                target_player: user.clone(),
                button_x: x,
                button_y: y,
                created_at: chrono::Utc::now(),
            });
        }
        Ok(())
    }

    pub fn draw(&mut self, user: &UserId, rng: &mut dyn TableRng) -> EngineResult<()> {
        self.require_current_player(user)?;
        self.clear_own_mandate(user);

        let top = self.top_card()?;
        let current_color = self.current_color.ok_or(EngineError::Internal {
            reason: "no current color set".to_string(),
        })?;
        let hand = self.hands.get(user).ok_or(EngineError::NotFound)?;
        if has_any_playable(hand, top.face, current_color) {
            return Err(EngineError::invalid_action(
                "must play a playable card instead of drawing",
            ));
        }

        let drawn = self.draw_cards(user, 1, rng);
        match drawn.first() {
            Some(card) => {
                let hand_now = self.hands.get(user).expect("just drew into this hand");
                if is_legal_play(card.face, top.face, current_color, hand_now) {
                    self.drawn_playable = Some(DrawnPlayable {
                        player: user.clone(),
                        card: card.id,
                    });
                } else {
                    self.drawn_playable = None;
                    let seat = self.seat_of(user)?;
                    self.current_player_idx = Some(self.seat_offset(seat, 1));
                }
            }
            None => {
                // Both piles are exhausted; draw is a no-op and the turn
                // still passes so the game doesn't stall.
                self.drawn_playable = None;
                let seat = self.seat_of(user)?;
                self.current_player_idx = Some(self.seat_offset(seat, 1));
            }
        }
        Ok(())
    }

    pub fn pass(&mut self, user: &UserId) -> EngineResult<()> {
        let seat = self.require_current_player(user)?;
        match &self.drawn_playable {
            Some(dp) if &dp.player == user => {}
            _ => return Err(EngineError::invalid_action("nothing drawn to pass on")),
        }
        self.drawn_playable = None;
        self.current_player_idx = Some(self.seat_offset(seat, 1));
        Ok(())
    }

    pub fn call_uno(&mut self, user: &UserId) -> EngineResult<()> {
        if self.must_call_uno.as_ref() != Some(user) {
            return Err(EngineError::invalid_action("no UNO obligation to call"));
        }
        self.must_call_uno = None;
        self.prompt = None;
        Ok(())
    }

    pub fn catch_uno(&mut self, accuser: &UserId, rng: &mut dyn TableRng) -> EngineResult<()> {
        let violator = match &self.must_call_uno {
            Some(v) if v == accuser => {
                return Err(EngineError::invalid_action("cannot catch your own UNO obligation"));
            }
            Some(v) => v.clone(),
            None => return Err(EngineError::invalid_action("no UNO obligation to catch")),
        };
        self.draw_cards(&violator, 2, rng);
        self.must_call_uno = None;
        self.prompt = None;
        Ok(())
    }

    /// Total cards across hands, draw pile, and discard pile — must stay
    /// at 108 for the lifetime of the game, per spec.md §8.
    #[must_use]
    pub fn total_card_count(&self) -> usize {
        let in_hands: usize = self.hands.values().map(Vec::len).sum();
        in_hands + self.draw_pile.len() + self.discard_pile.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::DeterministicRng;

    fn roster(n: usize) -> Vec<PlayerInfo> {
        (0..n)
            .map(|i| PlayerInfo::new(UserId::new(format!("u{i}")), i, format!("p{i}")))
            .collect()
    }

    #[test]
    fn reverse_acts_as_skip_heads_up() {
        let mut state = UnoState::default();
        let mut rng = DeterministicRng::seeded(3);
        state.start_game(roster(2), &mut rng).unwrap();
        state.current_player_idx = Some(0);
        state.direction = 1;

        let card = Card {
            id: state.card_alloc.next(),
            face: Face::Reverse { color: Color::Red },
        };
        state.hands.get_mut(&UserId::new("u0")).unwrap().push(card);
        state.discard_pile.push(Card {
            id: state.card_alloc.next(),
            face: Face::Number { color: Color::Red, value: 5 },
        });
        state.current_color = Some(Color::Red);

        state.play(&UserId::new("u0"), card.id, None, &mut rng).unwrap();
        assert_eq!(state.direction, -1);
        assert_eq!(state.current_player_idx, Some(0));
    }

    #[test]
    fn wild4_rejected_when_hand_holds_current_color() {
        let mut state = UnoState::default();
        let mut rng = DeterministicRng::seeded(5);
        state.start_game(roster(3), &mut rng).unwrap();
        state.current_color = Some(Color::Red);
        state.current_player_idx = Some(0);

        let user = UserId::new("u0");
        let wild4 = Card {
            id: state.card_alloc.next(),
            face: Face::Wild4,
        };
        let red_card = Card {
            id: state.card_alloc.next(),
            face: Face::Number { color: Color::Red, value: 3 },
        };
        state.discard_pile.push(Card {
            id: state.card_alloc.next(),
            face: Face::Number { color: Color::Blue, value: 7 },
        });
        state.hands.insert(user.clone(), vec![wild4, red_card]);

        let err = state.play(&user, wild4.id, Some(Color::Blue), &mut rng).unwrap_err();
        assert_eq!(err, EngineError::invalid_action("card is not playable"));
    }

    #[test]
    fn catch_uno_draws_two_and_clears_mandate() {
        let mut state = UnoState::default();
        let mut rng = DeterministicRng::seeded(11);
        state.start_game(roster(2), &mut rng).unwrap();
        let violator = UserId::new("u0");
        let accuser = UserId::new("u1");
        state.must_call_uno = Some(violator.clone());
        let before = state.hands.get(&violator).unwrap().len();

        state.catch_uno(&accuser, &mut rng).unwrap();

        assert_eq!(state.hands.get(&violator).unwrap().len(), before + 2);
        assert!(state.must_call_uno.is_none());
    }

    #[test]
    fn second_call_uno_by_same_player_is_a_no_op_error() {
        let mut state = UnoState::default();
        let mut rng = DeterministicRng::seeded(2);
        state.start_game(roster(2), &mut rng).unwrap();
        let user = UserId::new("u0");
        state.must_call_uno = Some(user.clone());

        state.call_uno(&user).unwrap();
        let err = state.call_uno(&user).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction { .. }));
    }

    #[test]
    fn total_card_count_stays_at_108_after_deal() {
        let mut state = UnoState::default();
        let mut rng = DeterministicRng::seeded(21);
        state.start_game(roster(4), &mut rng).unwrap();
        assert_eq!(state.total_card_count(), 108);
    }
}
