//! Reward issuance seam.
//!
//! The engine is oblivious to the rewards schema (spec.md §6's "Persisted
//! state layout... Engine is oblivious to schema"); it only calls this
//! trait at the moment a hand/game reaches a terminal transition, guarded
//! by `Lobby::reward_issued` so a reward is issued at most once per hand,
//! per spec.md §3's invariant list. No teacher module has an equivalent
//! seam — the teacher talks to its `WalletManager`/`PgPool` directly from
//! `TableActor`; this narrows that to one trait so the engine core stays
//! free of any particular storage.

use async_trait::async_trait;

use crate::identity::{GameType, UserId};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RewardOutcome {
    PokerWin { pot_share: u32 },
    UnoWin,
}

/// Implemented by whatever persists coins/win-counts/cosmetics. The
/// engine calls this at most once per hand per spec's idempotency
/// invariant; implementations don't need their own dedupe.
#[async_trait]
pub trait RewardsSink: Send + Sync {
    async fn issue(&self, game_type: GameType, lobby_code: &str, winner: &UserId, outcome: RewardOutcome);
}

/// Default sink for configurations with no rewards collaborator wired up
/// (e.g. integration tests, or a deployment that tracks coins elsewhere).
pub struct NoopRewardsSink;

#[async_trait]
impl RewardsSink for NoopRewardsSink {
    async fn issue(&self, _game_type: GameType, _lobby_code: &str, _winner: &UserId, _outcome: RewardOutcome) {}
}
