//! End-to-end protocol tests driven entirely through [`Dispatcher`], the
//! same surface a websocket handler would call.

use std::sync::Arc;

use tablehall::broadcast::GameView;
use tablehall::dispatch::{Command, Dispatcher};
use tablehall::identity::GameType;
use tablehall::lobby::{self, LobbyRegistry, SharedRegistry};
use tablehall::rewards::NoopRewardsSink;
use tablehall::session::PresenceRegistry;
use tablehall::UserId;

fn new_dispatcher() -> (Dispatcher, SharedRegistry) {
    let registry: SharedRegistry = Arc::new(LobbyRegistry::new());
    let presence = Arc::new(PresenceRegistry::new());
    let dispatcher = Dispatcher::new(Arc::clone(&registry), presence, Arc::new(NoopRewardsSink));
    (dispatcher, registry)
}

#[tokio::test]
async fn create_join_and_start_a_private_poker_lobby() {
    let (dispatcher, _registry) = new_dispatcher();
    let host = UserId::new("host");
    let guest = UserId::new("guest");

    let ack = dispatcher
        .dispatch(1, &host, "Host", Command::CreateLobby { game_type: GameType::Poker })
        .await;
    assert!(ack.success);
    let code = ack.snapshot.expect("create returns a snapshot").code;

    let ack = dispatcher
        .dispatch(
            2,
            &guest,
            "Guest",
            Command::JoinLobby { game_type: GameType::Poker, code: code.clone() },
        )
        .await;
    assert!(ack.success);
    assert_eq!(ack.snapshot.unwrap().players.len(), 2);

    let ack = dispatcher
        .dispatch(
            1,
            &host,
            "Host",
            Command::StartGame { game_type: GameType::Poker, lobby_code: code.clone() },
        )
        .await;
    assert!(ack.success, "start_game failed: {:?}", ack.reason);

    let ack = dispatcher
        .dispatch(
            1,
            &host,
            "Host",
            Command::RequestState { game_type: GameType::Poker, lobby_code: code },
        )
        .await;
    let snapshot = ack.snapshot.expect("request_state returns a snapshot");
    match snapshot.game {
        GameView::Poker(view) => assert_eq!(view.players.len(), 2),
        GameView::Uno(_) => panic!("expected a poker view"),
    }
}

#[tokio::test]
async fn starting_with_only_one_connected_player_is_rejected() {
    let (dispatcher, _registry) = new_dispatcher();
    let host = UserId::new("host");

    let ack = dispatcher
        .dispatch(1, &host, "Host", Command::CreateLobby { game_type: GameType::Uno })
        .await;
    let code = ack.snapshot.unwrap().code;

    let ack = dispatcher
        .dispatch(1, &host, "Host", Command::StartGame { game_type: GameType::Uno, lobby_code: code })
        .await;
    assert!(!ack.success);
    assert_eq!(ack.error.as_deref(), Some("invalid_action"));
}

#[tokio::test]
async fn a_guest_cannot_end_someone_elses_private_lobby() {
    let (dispatcher, _registry) = new_dispatcher();
    let host = UserId::new("host");
    let guest = UserId::new("guest");

    let ack = dispatcher
        .dispatch(1, &host, "Host", Command::CreateLobby { game_type: GameType::Poker })
        .await;
    let code = ack.snapshot.unwrap().code;
    dispatcher
        .dispatch(2, &guest, "Guest", Command::JoinLobby { game_type: GameType::Poker, code: code.clone() })
        .await;

    let ack = dispatcher
        .dispatch(2, &guest, "Guest", Command::EndLobby { game_type: GameType::Poker, lobby_code: code })
        .await;
    assert!(!ack.success);
    assert_eq!(ack.error.as_deref(), Some("not_authorized"));
}

#[tokio::test]
async fn public_lobbies_reject_end_lobby_and_cannot_be_removed() {
    let registry: SharedRegistry = Arc::new(LobbyRegistry::new());
    let rewards: Arc<dyn tablehall::rewards::RewardsSink> = Arc::new(NoopRewardsSink);
    lobby::bootstrap_public_lobbies(&registry, &rewards).await;
    let presence = Arc::new(PresenceRegistry::new());
    let dispatcher = Dispatcher::new(Arc::clone(&registry), presence, rewards);

    let host = UserId::new("anyone");
    let ack = dispatcher
        .dispatch(
            1,
            &host,
            "Anyone",
            Command::JoinLobby { game_type: GameType::Poker, code: "POKER_PUBLIC_1".to_string() },
        )
        .await;
    assert!(ack.success);

    let ack = dispatcher
        .dispatch(
            1,
            &host,
            "Anyone",
            Command::EndLobby { game_type: GameType::Poker, lobby_code: "POKER_PUBLIC_1".to_string() },
        )
        .await;
    assert!(!ack.success);
    assert_eq!(ack.error.as_deref(), Some("invalid_action"));
}

#[tokio::test]
async fn list_public_rooms_reports_all_six_reserved_codes() {
    let registry: SharedRegistry = Arc::new(LobbyRegistry::new());
    let rewards: Arc<dyn tablehall::rewards::RewardsSink> = Arc::new(NoopRewardsSink);
    lobby::bootstrap_public_lobbies(&registry, &rewards).await;
    let presence = Arc::new(PresenceRegistry::new());
    let dispatcher = Dispatcher::new(Arc::clone(&registry), presence, rewards);

    let ack = dispatcher
        .dispatch(1, &UserId::new("u"), "U", Command::ListPublicRooms { game_type: None })
        .await;
    assert!(ack.success);
    assert_eq!(ack.rooms.len(), 6);
    assert_eq!(ack.rooms.iter().filter(|r| r.game_type == GameType::Poker).count(), 3);
    assert_eq!(ack.rooms.iter().filter(|r| r.game_type == GameType::Uno).count(), 3);
}

#[tokio::test]
async fn leaving_an_empty_private_lobby_removes_it_from_the_registry() {
    let (dispatcher, registry) = new_dispatcher();
    let host = UserId::new("host");

    let ack = dispatcher
        .dispatch(1, &host, "Host", Command::CreateLobby { game_type: GameType::Poker })
        .await;
    let code = ack.snapshot.unwrap().code;
    assert!(registry.contains(GameType::Poker, &code).await);

    let ack = dispatcher
        .dispatch(1, &host, "Host", Command::LeaveLobby { game_type: GameType::Poker, lobby_code: code.clone() })
        .await;
    assert!(ack.success);

    // The actor's run loop unregisters itself asynchronously after the
    // Leave message is handled; give it a beat to exit.
    tokio::task::yield_now().await;
    for _ in 0..50 {
        if !registry.contains(GameType::Poker, &code).await {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(!registry.contains(GameType::Poker, &code).await);
}

#[tokio::test]
async fn a_user_already_in_a_lobby_cannot_join_a_different_one() {
    let (dispatcher, _registry) = new_dispatcher();
    let user = UserId::new("busy");

    let ack = dispatcher
        .dispatch(1, &user, "Busy", Command::CreateLobby { game_type: GameType::Poker })
        .await;
    assert!(ack.success);

    let ack = dispatcher
        .dispatch(1, &user, "Busy", Command::CreateLobby { game_type: GameType::Uno })
        .await;
    assert!(!ack.success);
    assert_eq!(ack.error.as_deref(), Some("already_in_lobby"));
}

#[tokio::test]
async fn player_action_mismatched_with_the_lobbys_game_is_rejected() {
    let (dispatcher, _registry) = new_dispatcher();
    let host = UserId::new("host");
    let guest = UserId::new("guest");

    let ack = dispatcher
        .dispatch(1, &host, "Host", Command::CreateLobby { game_type: GameType::Uno })
        .await;
    let code = ack.snapshot.unwrap().code;
    dispatcher
        .dispatch(2, &guest, "Guest", Command::JoinLobby { game_type: GameType::Uno, code: code.clone() })
        .await;
    dispatcher
        .dispatch(1, &host, "Host", Command::StartGame { game_type: GameType::Uno, lobby_code: code.clone() })
        .await;

    let ack = dispatcher
        .dispatch(
            1,
            &host,
            "Host",
            Command::PlayerAction {
                game_type: GameType::Uno,
                lobby_code: code,
                command: tablehall::lobby::messages::PlayerCommand::Poker {
                    action: tablehall::poker::PokerAction::Check,
                    amount: None,
                },
            },
        )
        .await;
    assert!(!ack.success);
    assert_eq!(ack.error.as_deref(), Some("invalid_action"));
}
