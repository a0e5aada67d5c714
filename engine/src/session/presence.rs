//! Connection/identity/lobby presence indices and the reconnect grace
//! window, per spec.md §4.F.
//!
//! No teacher module maintains an equivalent cross-table identity index —
//! `pp_server`'s session layer is HTTP-cookie/JWT based and ties a
//! connection to exactly one table by construction. This generalizes
//! that one-table assumption into the three-index scheme the spec
//! requires for a user who can hold at most one active lobby across both
//! games.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::error::{EngineError, EngineResult};
use crate::identity::{GameType, UserId};
use crate::lobby::SharedRegistry;

pub type ConnectionId = u64;

/// Default reconnect grace window, per spec.md §4.F.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(15);

#[derive(Clone, Debug)]
struct ConnectionInfo {
    user: UserId,
    lobby_code: String,
    game_type: GameType,
}

/// Shared across every lobby; all mutations go through `&self` methods
/// backed by a lock, per spec.md §5's "Session indices are shared across
/// all lobbies; updates must be atomic per key."
pub struct PresenceRegistry {
    connections: RwLock<HashMap<ConnectionId, ConnectionInfo>>,
    by_identity: RwLock<HashMap<(GameType, UserId), ConnectionId>>,
    active_lobby: RwLock<HashMap<UserId, (GameType, String)>>,
    grace: Duration,
}

impl PresenceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            by_identity: RwLock::new(HashMap::new()),
            active_lobby: RwLock::new(HashMap::new()),
            grace: DEFAULT_GRACE,
        }
    }

    /// Rejects a join/create if `user` already has an active lobby in a
    /// *different* lobby/game; rejoining the same lobby is a reconnect.
    pub async fn claim(
        &self,
        conn_id: ConnectionId,
        user: &UserId,
        game_type: GameType,
        lobby_code: &str,
    ) -> EngineResult<()> {
        {
            let active = self.active_lobby.read().await;
            if let Some((existing_type, existing_code)) = active.get(user) {
                if *existing_type != game_type || existing_code != lobby_code {
                    return Err(EngineError::AlreadyInLobby { user: user.clone() });
                }
            }
        }

        self.connections.write().await.insert(
            conn_id,
            ConnectionInfo {
                user: user.clone(),
                lobby_code: lobby_code.to_string(),
                game_type,
            },
        );
        self.by_identity
            .write()
            .await
            .insert((game_type, user.clone()), conn_id);
        self.active_lobby
            .write()
            .await
            .insert(user.clone(), (game_type, lobby_code.to_string()));
        Ok(())
    }

    /// Fully releases `user`'s active-lobby claim, e.g. after an explicit
    /// leave or a grace timer firing.
    pub async fn release(&self, user: &UserId) {
        self.active_lobby.write().await.remove(user);
    }

    /// `true` if `user` already holds an active-lobby claim anywhere.
    /// Used to reject a brand new lobby creation before it's registered,
    /// rather than creating and registering one and only then discovering
    /// the claim will fail — which would leak an orphaned, unjoined lobby.
    pub async fn has_active(&self, user: &UserId) -> bool {
        self.active_lobby.read().await.contains_key(user)
    }

    pub async fn connection_info(&self, conn_id: ConnectionId) -> Option<(UserId, GameType, String)> {
        self.connections
            .read()
            .await
            .get(&conn_id)
            .map(|info| (info.user.clone(), info.game_type, info.lobby_code.clone()))
    }

    /// Marks the player disconnected, arms a grace timer, and — unless a
    /// newer connection has since taken over the identity mapping (the
    /// race guard from spec.md §4.F) — issues a full leave when it fires.
    pub fn disconnect(
        self: &Arc<Self>,
        registry: SharedRegistry,
        conn_id: ConnectionId,
    ) {
        let presence = Arc::clone(self);
        tokio::spawn(async move {
            let Some((user, game_type, lobby_code)) = presence.connection_info(conn_id).await else {
                return;
            };

            if let Ok(handle) = registry.get(game_type, &lobby_code).await {
                let _ = handle.disconnect(user.clone()).await;
            }

            tokio::time::sleep(presence.grace).await;

            let still_stale = presence
                .by_identity
                .read()
                .await
                .get(&(game_type, user.clone()))
                .is_some_and(|current| *current == conn_id);
            if !still_stale {
                return;
            }

            presence.connections.write().await.remove(&conn_id);
            presence.by_identity.write().await.remove(&(game_type, user.clone()));
            presence.release(&user).await;

            if let Ok(handle) = registry.get(game_type, &lobby_code).await {
                let _ = handle.leave(user).await;
            }
        });
    }

    /// Cancels a pending disconnect by re-registering the identity under
    /// a new connection id, so the stale timer's race-guard check above
    /// observes a mismatch and no-ops.
    pub async fn reconnect(
        &self,
        new_conn_id: ConnectionId,
        user: &UserId,
        game_type: GameType,
        lobby_code: &str,
    ) {
        self.connections.write().await.insert(
            new_conn_id,
            ConnectionInfo {
                user: user.clone(),
                lobby_code: lobby_code.to_string(),
                game_type,
            },
        );
        self.by_identity
            .write()
            .await
            .insert((game_type, user.clone()), new_conn_id);
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedPresence = Arc<PresenceRegistry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn claim_rejects_a_second_different_lobby() {
        let presence = PresenceRegistry::new();
        let user = UserId::new("u1");
        presence.claim(1, &user, GameType::Poker, "AAAAAA").await.unwrap();
        let err = presence
            .claim(2, &user, GameType::Uno, "BBBBBB")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "already_in_lobby");
    }

    #[tokio::test]
    async fn claim_allows_rejoining_the_same_lobby() {
        let presence = PresenceRegistry::new();
        let user = UserId::new("u1");
        presence.claim(1, &user, GameType::Poker, "AAAAAA").await.unwrap();
        presence.claim(2, &user, GameType::Poker, "AAAAAA").await.unwrap();
    }
}
