//! UNO: player/prompt entities and the per-game state machine.

pub mod engine;
pub mod entities;

pub use engine::UnoState;
pub use entities::{DrawnPlayable, UnoPrompt};
