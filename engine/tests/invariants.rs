//! Property-based invariants that must hold regardless of the specific
//! sequence of inputs, per spec.md §8/§9.

use std::collections::HashSet;

use proptest::prelude::*;

use tablehall::cards::poker::{Card, Rank, Suit};
use tablehall::cards::uno::CardIdAllocator;
use tablehall::identity::{PlayerInfo, UserId};
use tablehall::lobby::entities::Lobby;
use tablehall::poker::engine::PokerState;
use tablehall::poker::entities::{Pot, PokerPlayer};
use tablehall::uno::UnoState;
use tablehall::rng::{shuffle, DeterministicRng};

fn fixed_hole() -> [Card; 2] {
    [Card::new(Rank::Three, Suit::Diamonds), Card::new(Rank::Four, Suit::Clubs)]
}

fn fixed_community() -> Vec<Card> {
    vec![
        Card::new(Rank::Two, Suit::Clubs),
        Card::new(Rank::Seven, Suit::Hearts),
        Card::new(Rank::Nine, Suit::Diamonds),
        Card::new(Rank::Jack, Suit::Spades),
        Card::new(Rank::King, Suit::Clubs),
    ]
}

proptest! {
    /// Every dollar committed to the pot is paid out to exactly one
    /// eligible winner, as long as no folded player's investment exceeds
    /// the largest non-folded investment (the one documented edge case
    /// where a folded overbet is never returned, per spec.md §9's Open
    /// Question on side-pot construction).
    #[test]
    fn side_pot_payouts_exactly_exhaust_the_pot(
        seats in prop::collection::vec((1u32..=500, any::<bool>()), 2..=6),
    ) {
        let non_folded_max = seats.iter().filter(|(_, folded)| !folded).map(|(amount, _)| *amount).max();
        prop_assume!(non_folded_max.is_some());
        let non_folded_max = non_folded_max.unwrap();
        prop_assume!(seats.iter().all(|(amount, folded)| !folded || *amount <= non_folded_max));

        let mut state = PokerState::new(5, 10);
        state.community = fixed_community();
        state.dealer_idx = 0;
        state.players = seats
            .iter()
            .enumerate()
            .map(|(seat, (_, folded))| {
                let info = PlayerInfo::new(UserId::new(format!("p{seat}")), seat, format!("p{seat}"));
                let mut player = PokerPlayer::new(info, 1000);
                player.folded = *folded;
                player.hole_cards = Some(fixed_hole());
                player
            })
            .collect();

        let mut pot = Pot::default();
        for (seat, (amount, _)) in seats.iter().enumerate() {
            pot.commit(seat, *amount);
        }
        state.pot = pot;

        let payouts = state.showdown();
        let total_payout: u32 = payouts.iter().map(|(_, amount)| amount).sum();
        prop_assert_eq!(total_payout, state.pot.get_size());
    }

    /// `bump_version` is strictly monotonic: calling it `n` times advances
    /// `version` by exactly `n`, never skipping or repeating a value.
    #[test]
    fn lobby_version_is_strictly_monotonic(bumps in 0usize..200) {
        let mut lobby = Lobby::new_poker("TESTCODE".to_string(), false, 8);
        let start = lobby.version;
        for _ in 0..bumps {
            lobby.bump_version();
        }
        prop_assert_eq!(lobby.version, start + bumps as u64);
    }

    /// `CardIdAllocator` never repeats an id no matter how many are drawn.
    #[test]
    fn card_id_allocator_never_repeats(n in 0u32..500) {
        let mut alloc = CardIdAllocator::default();
        let mut seen = HashSet::new();
        for _ in 0..n {
            prop_assert!(seen.insert(alloc.next()));
        }
    }

    /// Dealing a UNO game to any seated roster always conserves all 108
    /// cards across hands, draw pile, and discard pile, across many seeds
    /// and roster sizes.
    #[test]
    fn uno_deal_always_conserves_108_cards(seed in 0u64..200, n_players in 2usize..=10) {
        let mut state = UnoState::default();
        let mut rng = DeterministicRng::seeded(seed);
        let roster: Vec<PlayerInfo> = (0..n_players)
            .map(|i| PlayerInfo::new(UserId::new(format!("u{i}")), i, format!("p{i}")))
            .collect();
        state.start_game(roster, &mut rng).unwrap();
        prop_assert_eq!(state.total_card_count(), 108);
    }

    /// Shuffling any slice is a permutation: same multiset of elements,
    /// for any length and seed.
    #[test]
    fn shuffle_is_always_a_permutation(seed in 0u64..1000, len in 0usize..64) {
        let original: Vec<u32> = (0..len as u32).collect();
        let mut shuffled = original.clone();
        let mut rng = DeterministicRng::seeded(seed);
        shuffle(&mut shuffled, &mut rng);
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, original);
    }
}
