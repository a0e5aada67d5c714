//! Cross-lobby presence tracking: connection identity, reconnect grace,
//! and the at-most-one-active-lobby guard.

pub mod presence;

pub use presence::{ConnectionId, PresenceRegistry, SharedPresence, DEFAULT_GRACE};
