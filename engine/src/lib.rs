//! # `tablehall`
//!
//! Authoritative, transport-agnostic game-state engine for realtime
//! multiplayer Texas Hold'em and UNO lobbies.
//!
//! The engine owns every rule of both games and the lobby/session
//! bookkeeping around them; it performs no network I/O itself. A hosting
//! shell (see the `tablehall-server` crate) terminates connections,
//! deserializes commands into [`dispatch::Command`], and relays
//! [`dispatch::Ack`]s and broadcast snapshots back out over whatever
//! transport it speaks.
//!
//! ## Core modules
//!
//! - [`cards`]: card identity and deck construction for both games.
//! - [`poker`]: hand evaluation and the per-hand Texas Hold'em state machine.
//! - [`uno`]: the per-game UNO state machine.
//! - [`lobby`]: lobby metadata, the per-lobby actor, and code registry.
//! - [`session`]: cross-lobby presence, reconnect grace, and the
//!   at-most-one-active-lobby guard.
//! - [`broadcast`]: per-viewer state projection and one-shot event dedupe.
//! - [`dispatch`]: command envelope validation and routing.
//! - [`rewards`]: the persistence seam for coin/win-count rewards.

pub mod broadcast;
pub mod cards;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod lobby;
pub mod metrics;
pub mod poker;
pub mod rewards;
pub mod rng;
pub mod session;
pub mod uno;

pub use error::{EngineError, EngineResult};
pub use identity::{GameType, PlayerInfo, SeatIndex, UserId};
