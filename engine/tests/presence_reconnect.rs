//! Reconnect-grace race-guard behavior, driven through the real
//! [`PresenceRegistry::disconnect`] timer rather than re-implementing its
//! logic in the test.

use std::sync::Arc;
use std::time::Duration;

use tablehall::identity::{GameType, PlayerInfo};
use tablehall::lobby::{self, LobbyRegistry, SharedRegistry};
use tablehall::rewards::{NoopRewardsSink, RewardsSink};
use tablehall::session::PresenceRegistry;
use tablehall::UserId;

async fn new_private_poker_lobby(
    registry: &SharedRegistry,
    rewards: &Arc<dyn RewardsSink>,
) -> String {
    lobby::create_private_lobby(registry, rewards, GameType::Poker).await
}

#[tokio::test(start_paused = true)]
async fn reconnecting_before_grace_expires_keeps_the_seat() {
    let registry: SharedRegistry = Arc::new(LobbyRegistry::new());
    let rewards: Arc<dyn RewardsSink> = Arc::new(NoopRewardsSink);
    let presence = Arc::new(PresenceRegistry::new());

    let code = new_private_poker_lobby(&registry, &rewards).await;
    let handle = registry.get(GameType::Poker, &code).await.unwrap();
    let user = UserId::new("p1");

    presence.claim(1, &user, GameType::Poker, &code).await.unwrap();
    handle
        .join(user.clone(), PlayerInfo::new(user.clone(), 0, "P1".to_string()))
        .await
        .unwrap();

    presence.disconnect(Arc::clone(&registry), 1);
    tokio::time::advance(Duration::from_secs(5)).await;

    // Reconnects under a new connection id, inside the 15s grace window.
    presence.reconnect(2, &user, GameType::Poker, &code).await;
    tokio::time::advance(Duration::from_secs(20)).await;
    tokio::task::yield_now().await;

    let snapshot = handle.get_state(user.clone()).await.unwrap();
    assert!(snapshot.players.iter().any(|p| p.user_id == user));
}

#[tokio::test(start_paused = true)]
async fn failing_to_reconnect_within_grace_removes_the_seat() {
    let registry: SharedRegistry = Arc::new(LobbyRegistry::new());
    let rewards: Arc<dyn RewardsSink> = Arc::new(NoopRewardsSink);
    let presence = Arc::new(PresenceRegistry::new());

    let code = new_private_poker_lobby(&registry, &rewards).await;
    let handle = registry.get(GameType::Poker, &code).await.unwrap();
    let host = UserId::new("host");
    let victim = UserId::new("p2");

    presence.claim(1, &host, GameType::Poker, &code).await.unwrap();
    handle
        .join(host.clone(), PlayerInfo::new(host.clone(), 0, "Host".to_string()))
        .await
        .unwrap();
    presence.claim(2, &victim, GameType::Poker, &code).await.unwrap();
    handle
        .join(victim.clone(), PlayerInfo::new(victim.clone(), 1, "P2".to_string()))
        .await
        .unwrap();

    presence.disconnect(Arc::clone(&registry), 2);
    tokio::time::advance(Duration::from_secs(20)).await;
    tokio::task::yield_now().await;

    let snapshot = handle.get_state(host.clone()).await.unwrap();
    assert!(!snapshot.players.iter().any(|p| p.user_id == victim));
    assert!(snapshot.players.iter().any(|p| p.user_id == host));
}
