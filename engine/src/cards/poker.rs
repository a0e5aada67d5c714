//! Poker card identity and deck construction.
//!
//! Grounded on the teacher's `game::entities::{Card, Suit, Deck}`, but
//! promoted from the teacher's `Card(Value, Suit)` tuple plus raw `u8`
//! value to a named struct + exhaustive `Rank` enum — the teacher's deck
//! only ever needed one game's worth of card semantics; this one needs
//! the wheel and a ten-way hand-rank comparison to stay exhaustive.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rng::TableRng;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Clubs => "♣",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Spades => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Rank of a single card. Numeric value is `2..=14`, with Ace reported as
/// 14 here; the wheel's "ace low" case is handled by the evaluator, not by
/// this type, matching spec.md §3's value mapping.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// A 52-card deck dealt off the top as `deal_card` advances a cursor, the
/// same style as the teacher's `Deck`.
#[derive(Debug)]
pub struct Deck {
    cards: [Card; 52],
    cursor: usize,
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = [Card::new(Rank::Two, Suit::Clubs); 52];
        for (i, rank) in Rank::ALL.into_iter().enumerate() {
            for (j, suit) in Suit::ALL.into_iter().enumerate() {
                cards[4 * i + j] = Card::new(rank, suit);
            }
        }
        Self { cards, cursor: 0 }
    }
}

impl Deck {
    #[must_use]
    pub fn fresh(rng: &mut dyn TableRng) -> Self {
        let mut deck = Self::default();
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle(&mut self, rng: &mut dyn TableRng) {
        crate::rng::shuffle(&mut self.cards, rng);
        self.cursor = 0;
    }

    /// Number of cards left to deal.
    #[must_use]
    pub fn remaining(&self) -> usize {
        52 - self.cursor
    }

    /// Deal the next card off the top. Panics if the deck is exhausted —
    /// a 52-card deck with at most 9 heads-up-capped players and 5
    /// community cards can never exhaust it (`9*2 + 5 = 23 < 52`), so
    /// this is an engine invariant violation, not a user-triggerable path.
    pub fn deal(&mut self) -> Card {
        let card = self.cards[self.cursor];
        self.cursor += 1;
        card
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::DeterministicRng;

    #[test]
    fn fresh_deck_has_fifty_two_unique_cards() {
        let mut rng = DeterministicRng::seeded(42);
        let deck = Deck::fresh(&mut rng);
        let mut seen = std::collections::HashSet::new();
        assert_eq!(deck.remaining(), 52);
        for rank in Rank::ALL {
            for suit in Suit::ALL {
                seen.insert(Card::new(rank, suit));
            }
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn deal_advances_cursor() {
        let mut rng = DeterministicRng::seeded(1);
        let mut deck = Deck::fresh(&mut rng);
        let _ = deck.deal();
        let _ = deck.deal();
        assert_eq!(deck.remaining(), 50);
    }
}
