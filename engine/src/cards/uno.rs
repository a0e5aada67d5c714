//! UNO card identity and the canonical 108-card deck.
//!
//! No UNO reference implementation exists in the teacher repo — this
//! module follows the teacher's general entity idiom (plain data structs,
//! a `Display` impl, a `Default`-constructed deck) rather than a specific
//! source file, the same way `game::entities::Deck` builds its 52 cards
//! from nested loops over a fixed alphabet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rng::TableRng;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
        };
        write!(f, "{repr}")
    }
}

/// The face of a card, independent of its stable identifier. `Wild` and
/// `Wild4` carry no color on the card itself — the color in play after
/// they're played is tracked separately as the lobby's `current_color`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Face {
    Number { color: Color, value: u8 },
    Skip { color: Color },
    Reverse { color: Color },
    Draw2 { color: Color },
    Wild,
    Wild4,
}

impl Face {
    /// The card's color, for colored faces. `None` for Wild/Wild4.
    #[must_use]
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Number { color, .. }
            | Self::Skip { color }
            | Self::Reverse { color }
            | Self::Draw2 { color } => Some(*color),
            Self::Wild | Self::Wild4 => None,
        }
    }

    #[must_use]
    pub fn is_wild(&self) -> bool {
        matches!(self, Self::Wild | Self::Wild4)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number { color, value } => write!(f, "{color} {value}"),
            Self::Skip { color } => write!(f, "{color} skip"),
            Self::Reverse { color } => write!(f, "{color} reverse"),
            Self::Draw2 { color } => write!(f, "{color} draw2"),
            Self::Wild => write!(f, "wild"),
            Self::Wild4 => write!(f, "wild4"),
        }
    }
}

/// Stable per-lobby card identifier. A monotonic counter satisfies the
/// "unique within a lobby lifetime" invariant without the overhead of a
/// UUID per card, and keeps card ids human-readable in logs/tests.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CardId(pub u32);

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub face: Face,
}

/// Allocates monotonically increasing [`CardId`]s for one lobby's
/// lifetime. Owned by `UnoState`, never reset.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct CardIdAllocator(u32);

impl CardIdAllocator {
    pub fn next(&mut self) -> CardId {
        let id = CardId(self.0);
        self.0 += 1;
        id
    }
}

/// Builds the canonical 108-card UNO deck: per color, one 0 and two each
/// of 1..9, two Skip, two Reverse, two Draw2; plus four Wild and four
/// Wild4.
pub fn fresh_deck(alloc: &mut CardIdAllocator) -> Vec<Card> {
    let mut cards = Vec::with_capacity(108);
    for color in Color::ALL {
        cards.push(Card {
            id: alloc.next(),
            face: Face::Number { color, value: 0 },
        });
        for value in 1..=9u8 {
            for _ in 0..2 {
                cards.push(Card {
                    id: alloc.next(),
                    face: Face::Number { color, value },
                });
            }
        }
        for _ in 0..2 {
            cards.push(Card {
                id: alloc.next(),
                face: Face::Skip { color },
            });
            cards.push(Card {
                id: alloc.next(),
                face: Face::Reverse { color },
            });
            cards.push(Card {
                id: alloc.next(),
                face: Face::Draw2 { color },
            });
        }
    }
    for _ in 0..4 {
        cards.push(Card {
            id: alloc.next(),
            face: Face::Wild,
        });
        cards.push(Card {
            id: alloc.next(),
            face: Face::Wild4,
        });
    }
    cards
}

pub fn shuffle(cards: &mut Vec<Card>, rng: &mut dyn TableRng) {
    crate::rng::shuffle(cards.as_mut_slice(), rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::DeterministicRng;

    #[test]
    fn fresh_deck_has_108_cards_with_unique_ids() {
        let mut alloc = CardIdAllocator::default();
        let deck = fresh_deck(&mut alloc);
        assert_eq!(deck.len(), 108);
        let ids: std::collections::HashSet<_> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 108);
    }

    #[test]
    fn deck_has_expected_face_counts() {
        let mut alloc = CardIdAllocator::default();
        let deck = fresh_deck(&mut alloc);
        let wilds = deck.iter().filter(|c| c.face == Face::Wild).count();
        let wild4s = deck.iter().filter(|c| c.face == Face::Wild4).count();
        assert_eq!(wilds, 4);
        assert_eq!(wild4s, 4);
    }

    #[test]
    fn shuffle_preserves_card_set() {
        let mut alloc = CardIdAllocator::default();
        let deck = fresh_deck(&mut alloc);
        let mut shuffled = deck.clone();
        let mut rng = DeterministicRng::seeded(9);
        shuffle(&mut shuffled, &mut rng);
        let mut a: Vec<_> = deck.iter().map(|c| c.id).collect();
        let mut b: Vec<_> = shuffled.iter().map(|c| c.id).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
