//! Seven-to-five poker hand evaluation.
//!
//! The teacher's own `SubHand { rank: Rank, values: Vec<Value> }` is the
//! groundwork this module generalizes: same rank-class + tiebreak-vector
//! shape, extended to all ten hand classes (including Royal Flush as its
//! own top rank and the wheel) and to choosing the best 5 of up to 7
//! cards, per spec.md §4.B. Grouping by rank/suit rather than a perfect-
//! hash lookup table keeps this readable in the teacher's style, at the
//! cost of speed that doesn't matter at this table count.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::cards::poker::{Card, Suit};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandRank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl std::fmt::Display for HandRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
            Self::RoyalFlush => "royal flush",
        };
        write!(f, "{repr}")
    }
}

/// The evaluated strength of a 5-card (or best-of-up-to-7) hand: a rank
/// class, a high-to-low tiebreak vector, and the cards that make it up.
/// Ordered first by `rank`, then lexicographically by `tiebreak`, per
/// spec.md §4.B's comparison rule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandValue {
    pub rank: HandRank,
    pub tiebreak: Vec<u8>,
    pub cards: Vec<Card>,
}

impl PartialOrd for HandValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.tiebreak.cmp(&other.tiebreak))
    }
}

/// Evaluate the best 5-card hand out of `cards` (2..=7 cards: hole cards
/// plus whatever community cards are dealt so far).
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandValue {
    assert!(cards.len() >= 5, "evaluator requires at least 5 cards");

    let mut candidates = Vec::with_capacity(4);
    if let Some(v) = straight_flush_candidate(cards) {
        candidates.push(v);
    }
    if let Some(v) = four_of_a_kind_candidate(cards) {
        candidates.push(v);
    }
    if let Some(v) = full_house_candidate(cards) {
        candidates.push(v);
    }
    if let Some(v) = flush_candidate(cards) {
        candidates.push(v);
    }
    if let Some(v) = straight_candidate(cards) {
        candidates.push(v);
    }
    if let Some(v) = trips_candidate(cards) {
        candidates.push(v);
    }
    if let Some(v) = two_pair_candidate(cards) {
        candidates.push(v);
    }
    if let Some(v) = pair_candidate(cards) {
        candidates.push(v);
    }
    candidates.push(high_card_candidate(cards));

    candidates
        .into_iter()
        .max()
        .expect("high card candidate is always present")
}

/// Returns all players (by index into `hands`) sharing the strongest
/// hand, per spec.md §4.B's `findWinners`.
#[must_use]
pub fn find_winners(hands: &[(usize, HandValue)]) -> Vec<usize> {
    let best = match hands.iter().map(|(_, v)| v).max() {
        Some(b) => b.clone(),
        None => return Vec::new(),
    };
    hands
        .iter()
        .filter(|(_, v)| *v == best)
        .map(|(idx, _)| *idx)
        .collect()
}

fn by_suit(cards: &[Card]) -> HashMap<Suit, Vec<Card>> {
    let mut map: HashMap<Suit, Vec<Card>> = HashMap::new();
    for &c in cards {
        map.entry(c.suit).or_default().push(c);
    }
    map
}

/// Rank groups sorted by `(count desc, value desc)` — the order the
/// "prefer the highest available trips/pair" rules need.
fn rank_groups(cards: &[Card]) -> Vec<(u8, Vec<Card>)> {
    let mut map: HashMap<u8, Vec<Card>> = HashMap::new();
    for &c in cards {
        map.entry(c.rank.value()).or_default().push(c);
    }
    let mut groups: Vec<(u8, Vec<Card>)> = map.into_iter().collect();
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(b.0.cmp(&a.0)));
    groups
}

/// Highest straight (5-consecutive) among a value set, reporting the
/// wheel (A-2-3-4-5) as high card `5`. Returns the *real* high (14 for an
/// ace-high straight) so callers can reconstruct the card list; the
/// wheel's tiebreak-vector entry of `5` is applied by the caller.
fn straight_high(values: &HashSet<u8>) -> Option<u8> {
    for high in (5..=14u8).rev() {
        let ok = if high == 5 {
            [5u8, 4, 3, 2].iter().all(|v| values.contains(v)) && values.contains(&14)
        } else {
            ((high - 4)..=high).all(|v| values.contains(&v))
        };
        if ok {
            return Some(high);
        }
    }
    None
}

fn straight_cards(cards: &[Card], high: u8) -> Vec<Card> {
    let needed: Vec<u8> = if high == 5 {
        vec![14, 5, 4, 3, 2]
    } else {
        ((high - 4)..=high).rev().collect()
    };
    needed
        .into_iter()
        .map(|v| {
            *cards
                .iter()
                .find(|c| c.rank.value() == v)
                .expect("value present in straight")
        })
        .collect()
}

fn straight_flush_candidate(cards: &[Card]) -> Option<HandValue> {
    for (_, suited) in by_suit(cards) {
        if suited.len() < 5 {
            continue;
        }
        let values: HashSet<u8> = suited.iter().map(|c| c.rank.value()).collect();
        if let Some(high) = straight_high(&values) {
            let rank = if high == 14 {
                HandRank::RoyalFlush
            } else {
                HandRank::StraightFlush
            };
            let tiebreak = vec![if high == 5 { 5 } else { high }];
            return Some(HandValue {
                rank,
                tiebreak,
                cards: straight_cards(&suited, high),
            });
        }
    }
    None
}

fn four_of_a_kind_candidate(cards: &[Card]) -> Option<HandValue> {
    let groups = rank_groups(cards);
    let (quad_rank, quad_cards) = groups.iter().find(|(_, g)| g.len() == 4)?;
    let kicker = cards
        .iter()
        .filter(|c| c.rank.value() != *quad_rank)
        .map(|c| c.rank.value())
        .max()
        .unwrap_or(0);
    let mut hand_cards = quad_cards.clone();
    if let Some(k) = cards.iter().find(|c| c.rank.value() == kicker) {
        hand_cards.push(*k);
    }
    Some(HandValue {
        rank: HandRank::FourOfAKind,
        tiebreak: vec![*quad_rank, kicker],
        cards: hand_cards,
    })
}

fn full_house_candidate(cards: &[Card]) -> Option<HandValue> {
    let groups = rank_groups(cards);
    let trip_groups: Vec<&(u8, Vec<Card>)> = groups.iter().filter(|(_, g)| g.len() >= 3).collect();
    if trip_groups.is_empty() {
        return None;
    }
    let (trips_rank, trips_cards) = trip_groups[0];
    let pair: Option<(u8, Vec<Card>)> = if trip_groups.len() >= 2 {
        let (pair_rank, pair_cards) = trip_groups[1];
        Some((*pair_rank, pair_cards[..2].to_vec()))
    } else {
        groups
            .iter()
            .find(|(rank, g)| *rank != *trips_rank && g.len() >= 2)
            .map(|(rank, g)| (*rank, g[..2].to_vec()))
    };
    let (pair_rank, pair_cards) = pair?;
    let mut hand_cards = trips_cards[..3].to_vec();
    hand_cards.extend(pair_cards);
    Some(HandValue {
        rank: HandRank::FullHouse,
        tiebreak: vec![*trips_rank, pair_rank],
        cards: hand_cards,
    })
}

fn flush_candidate(cards: &[Card]) -> Option<HandValue> {
    let (_, mut suited) = by_suit(cards).into_iter().find(|(_, g)| g.len() >= 5)?;
    suited.sort_by(|a, b| b.rank.value().cmp(&a.rank.value()));
    suited.truncate(5);
    let tiebreak = suited.iter().map(|c| c.rank.value()).collect();
    Some(HandValue {
        rank: HandRank::Flush,
        tiebreak,
        cards: suited,
    })
}

fn straight_candidate(cards: &[Card]) -> Option<HandValue> {
    let values: HashSet<u8> = cards.iter().map(|c| c.rank.value()).collect();
    let high = straight_high(&values)?;
    Some(HandValue {
        rank: HandRank::Straight,
        tiebreak: vec![if high == 5 { 5 } else { high }],
        cards: straight_cards(cards, high),
    })
}

fn trips_candidate(cards: &[Card]) -> Option<HandValue> {
    let groups = rank_groups(cards);
    let (trips_rank, trips_cards) = groups.iter().find(|(_, g)| g.len() == 3)?;
    let mut kickers: Vec<u8> = cards
        .iter()
        .filter(|c| c.rank.value() != *trips_rank)
        .map(|c| c.rank.value())
        .collect();
    kickers.sort_unstable_by(|a, b| b.cmp(a));
    kickers.truncate(2);
    let mut tiebreak = vec![*trips_rank];
    tiebreak.extend(&kickers);
    let mut hand_cards = trips_cards[..3].to_vec();
    for k in &kickers {
        if let Some(c) = cards.iter().find(|c| c.rank.value() == *k) {
            hand_cards.push(*c);
        }
    }
    Some(HandValue {
        rank: HandRank::ThreeOfAKind,
        tiebreak,
        cards: hand_cards,
    })
}

fn two_pair_candidate(cards: &[Card]) -> Option<HandValue> {
    let groups = rank_groups(cards);
    let pairs: Vec<&(u8, Vec<Card>)> = groups.iter().filter(|(_, g)| g.len() >= 2).collect();
    if pairs.len() < 2 {
        return None;
    }
    let (hi_rank, hi_cards) = pairs[0];
    let (lo_rank, lo_cards) = pairs[1];
    let kicker = cards
        .iter()
        .filter(|c| c.rank.value() != *hi_rank && c.rank.value() != *lo_rank)
        .map(|c| c.rank.value())
        .max();
    let mut hand_cards = hi_cards[..2].to_vec();
    hand_cards.extend(lo_cards[..2].to_vec());
    let mut tiebreak = vec![*hi_rank, *lo_rank];
    if let Some(k) = kicker {
        tiebreak.push(k);
        if let Some(c) = cards.iter().find(|c| c.rank.value() == k) {
            hand_cards.push(*c);
        }
    }
    Some(HandValue {
        rank: HandRank::TwoPair,
        tiebreak,
        cards: hand_cards,
    })
}

fn pair_candidate(cards: &[Card]) -> Option<HandValue> {
    let groups = rank_groups(cards);
    let (pair_rank, pair_cards) = groups.iter().find(|(_, g)| g.len() == 2)?;
    let mut kickers: Vec<u8> = cards
        .iter()
        .filter(|c| c.rank.value() != *pair_rank)
        .map(|c| c.rank.value())
        .collect();
    kickers.sort_unstable_by(|a, b| b.cmp(a));
    kickers.truncate(3);
    let mut tiebreak = vec![*pair_rank];
    tiebreak.extend(&kickers);
    let mut hand_cards = pair_cards[..2].to_vec();
    for k in &kickers {
        if let Some(c) = cards.iter().find(|c| c.rank.value() == *k) {
            hand_cards.push(*c);
        }
    }
    Some(HandValue {
        rank: HandRank::OnePair,
        tiebreak,
        cards: hand_cards,
    })
}

fn high_card_candidate(cards: &[Card]) -> HandValue {
    let mut sorted = cards.to_vec();
    sorted.sort_by(|a, b| b.rank.value().cmp(&a.rank.value()));
    sorted.truncate(5);
    let tiebreak = sorted.iter().map(|c| c.rank.value()).collect();
    HandValue {
        rank: HandRank::HighCard,
        tiebreak,
        cards: sorted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::poker::Rank;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn wheel_straight_is_reported_as_five_high() {
        let cards = vec![
            card(Rank::Ace, Suit::Spades),
            card(Rank::Two, Suit::Diamonds),
            card(Rank::Three, Suit::Clubs),
            card(Rank::Four, Suit::Hearts),
            card(Rank::Five, Suit::Spades),
            card(Rank::King, Suit::Diamonds),
            card(Rank::Queen, Suit::Clubs),
        ];
        let hand = evaluate(&cards);
        assert_eq!(hand.rank, HandRank::Straight);
        assert_eq!(hand.tiebreak, vec![5]);
    }

    #[test]
    fn royal_flush_beats_straight_flush() {
        let royal = vec![
            card(Rank::Ace, Suit::Spades),
            card(Rank::King, Suit::Spades),
            card(Rank::Queen, Suit::Spades),
            card(Rank::Jack, Suit::Spades),
            card(Rank::Ten, Suit::Spades),
        ];
        let straight_flush = vec![
            card(Rank::Nine, Suit::Hearts),
            card(Rank::Eight, Suit::Hearts),
            card(Rank::Seven, Suit::Hearts),
            card(Rank::Six, Suit::Hearts),
            card(Rank::Five, Suit::Hearts),
        ];
        let a = evaluate(&royal);
        let b = evaluate(&straight_flush);
        assert_eq!(a.rank, HandRank::RoyalFlush);
        assert_eq!(b.rank, HandRank::StraightFlush);
        assert!(a > b);
    }

    #[test]
    fn full_house_prefers_highest_trips_when_two_trip_sets_exist() {
        let cards = vec![
            card(Rank::King, Suit::Spades),
            card(Rank::King, Suit::Hearts),
            card(Rank::King, Suit::Clubs),
            card(Rank::Two, Suit::Spades),
            card(Rank::Two, Suit::Hearts),
            card(Rank::Two, Suit::Clubs),
            card(Rank::Four, Suit::Diamonds),
        ];
        let hand = evaluate(&cards);
        assert_eq!(hand.rank, HandRank::FullHouse);
        assert_eq!(hand.tiebreak, vec![13, 2]);
    }

    #[test]
    fn find_winners_returns_all_ties() {
        let a = HandValue {
            rank: HandRank::OnePair,
            tiebreak: vec![10, 9, 8, 7],
            cards: vec![],
        };
        let b = a.clone();
        let c = HandValue {
            rank: HandRank::OnePair,
            tiebreak: vec![9, 9, 8, 7],
            cards: vec![],
        };
        let winners = find_winners(&[(0, a), (1, b), (2, c)]);
        assert_eq!(winners, vec![0, 1]);
    }
}
