//! One actor per lobby, linearizing every command against that lobby's
//! state — spec.md §5's "engine executes commands serially per lobby."
//!
//! Grounded directly on the teacher's `table::actor::{TableActor,
//! TableHandle}`: an mpsc inbox drained by `tokio::select!` alongside a
//! tick interval, `oneshot` reply channels per command, and a closed flag
//! that ends the loop.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Duration};

use crate::broadcast::{self, LobbySnapshot};
use crate::error::{EngineError, EngineResult};
use crate::identity::{GameType, PlayerInfo, UserId};
use crate::lobby::entities::{Celebration, GameState, Lobby, LobbyPhase};
use crate::lobby::messages::{LobbyMessage, PeekSnapshot, PlayerCommand};
use crate::rewards::{RewardOutcome, RewardsSink};
use crate::rng::SystemRng;

#[derive(Clone)]
pub struct LobbyHandle {
    sender: mpsc::Sender<LobbyMessage>,
    pub code: String,
    pub game_type: GameType,
}

impl LobbyHandle {
    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<EngineResult<T>>) -> LobbyMessage,
    ) -> EngineResult<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| EngineError::Transient {
                reason: "lobby actor is closed".to_string(),
            })?;
        rx.await.map_err(|_| EngineError::Transient {
            reason: "lobby actor dropped the response channel".to_string(),
        })?
    }

    pub async fn join(&self, user: UserId, info: PlayerInfo) -> EngineResult<LobbySnapshot> {
        self.call(|response| LobbyMessage::Join { user, info, response }).await
    }

    pub async fn leave(&self, user: UserId) -> EngineResult<()> {
        self.call(|response| LobbyMessage::Leave { user, response }).await
    }

    pub async fn start_game(&self, user: UserId) -> EngineResult<()> {
        self.call(|response| LobbyMessage::StartGame { user, response }).await
    }

    pub async fn player_action(&self, user: UserId, command: PlayerCommand) -> EngineResult<()> {
        self.call(|response| LobbyMessage::PlayerAction { user, command, response }).await
    }

    pub async fn get_state(&self, user: UserId) -> EngineResult<LobbySnapshot> {
        self.call(|response| LobbyMessage::GetState { user, response }).await
    }

    pub async fn end_lobby(&self, user: UserId) -> EngineResult<()> {
        self.call(|response| LobbyMessage::EndLobby { user, response }).await
    }

    pub async fn reveal_cards(&self, user: UserId, reveal: bool) -> EngineResult<()> {
        self.call(|response| LobbyMessage::RevealCards { user, reveal, response }).await
    }

    pub async fn disconnect(&self, user: UserId) -> EngineResult<()> {
        self.call(|response| LobbyMessage::Disconnect { user, response }).await
    }

    pub async fn subscribe(&self, user: UserId, sender: mpsc::Sender<LobbySnapshot>) -> EngineResult<()> {
        self.sender
            .send(LobbyMessage::Subscribe { user, sender })
            .await
            .map_err(|_| EngineError::Transient {
                reason: "lobby actor is closed".to_string(),
            })
    }

    pub async fn peek(&self) -> EngineResult<PeekSnapshot> {
        self.call(LobbyMessage::Peek).await
    }
}

pub struct LobbyActor {
    lobby: Lobby,
    inbox: mpsc::Receiver<LobbyMessage>,
    subscribers: std::collections::HashMap<UserId, mpsc::Sender<LobbySnapshot>>,
    rng: SystemRng,
    rewards: Arc<dyn RewardsSink>,
}

impl LobbyActor {
    /// `registry` is used only to remove this lobby's own entry once its
    /// run loop ends (a closed private lobby, or the channel dropping),
    /// so the registry never accumulates handles to dead actors.
    #[must_use]
    pub fn spawn(lobby: Lobby, rewards: Arc<dyn RewardsSink>, registry: crate::lobby::SharedRegistry) -> LobbyHandle {
        let (sender, inbox) = mpsc::channel(64);
        let code = lobby.code.clone();
        let game_type = lobby.game.game_type();
        let actor = Self {
            lobby,
            inbox,
            subscribers: std::collections::HashMap::new(),
            rng: SystemRng::default(),
            rewards,
        };
        tokio::spawn(actor.run(registry));
        LobbyHandle { sender, code, game_type }
    }

    async fn run(mut self, registry: crate::lobby::SharedRegistry) {
        log::info!("lobby {} starting", self.lobby.code);
        let code = self.lobby.code.clone();
        let game_type = self.lobby.game.game_type();
        let mut tick = interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                Some(message) = self.inbox.recv() => {
                    let is_disconnect_and_empty = self.handle(message).await;
                    if is_disconnect_and_empty {
                        break;
                    }
                }
                _ = tick.tick() => {
                    self.tick();
                }
                else => break,
            }
        }
        registry.unregister(game_type, &code).await;
        log::info!("lobby {code} closed");
    }

    /// Returns `true` if the actor should stop running (a private lobby
    /// with no players left).
    async fn handle(&mut self, message: LobbyMessage) -> bool {
        match message {
            LobbyMessage::Join { user, info, response } => {
                let result = self.handle_join(user, info);
                self.broadcast_if_ok(&result);
                let _ = response.send(result);
            }
            LobbyMessage::Leave { user, response } => {
                let result = self.handle_leave(&user);
                self.broadcast_if_ok(&result);
                let should_close = !self.lobby.is_public && self.lobby.players.is_empty();
                let _ = response.send(result);
                return should_close;
            }
            LobbyMessage::StartGame { user, response } => {
                let result = self.handle_start_game(&user);
                self.broadcast_if_ok(&result);
                let _ = response.send(result);
            }
            LobbyMessage::PlayerAction { user, command, response } => {
                let result = self.handle_player_action(&user, command).await;
                self.broadcast_if_ok(&result);
                let _ = response.send(result);
            }
            LobbyMessage::GetState { user, response } => {
                let snapshot = broadcast::project(&self.lobby, &user);
                let _ = response.send(Ok(snapshot));
            }
            LobbyMessage::EndLobby { user, response } => {
                let result = self.handle_end_lobby(&user);
                self.broadcast_if_ok(&result);
                let ended = result.is_ok();
                let _ = response.send(result);
                return ended;
            }
            LobbyMessage::RevealCards { user, reveal, response } => {
                // Per-winner reveal/hide override is an optional follow-up
                // prompt (spec's "if supported"); default projection
                // already reveals every non-folded hand at showdown, so
                // this is accepted but currently a no-op.
                let _ = (user, reveal);
                let _ = response.send(Ok(()));
            }
            LobbyMessage::Disconnect { user, response } => {
                let result = self.handle_disconnect(&user);
                self.broadcast_if_ok(&result);
                let _ = response.send(result);
            }
            LobbyMessage::Subscribe { user, sender } => {
                self.subscribers.insert(user, sender);
            }
            LobbyMessage::Peek { response } => {
                let snapshot = PeekSnapshot {
                    player_count: self.lobby.players.len(),
                    status: format!("{:?}", self.lobby.phase).to_lowercase(),
                    max_players: self.lobby.max_players,
                };
                let _ = response.send(Ok(snapshot));
            }
            LobbyMessage::Tick => {}
        }
        false
    }

    fn broadcast_if_ok<T>(&mut self, result: &EngineResult<T>) {
        if result.is_ok() {
            self.broadcast();
        }
    }

    fn broadcast(&mut self) {
        self.subscribers.retain(|user, sender| {
            let snapshot = broadcast::project(&self.lobby, user);
            sender.try_send(snapshot).is_ok() || !sender.is_closed()
        });
    }

    fn handle_join(&mut self, user: UserId, info: PlayerInfo) -> EngineResult<()> {
        if self.lobby.players.iter().any(|p| p.user_id == user) {
            return Ok(());
        }
        if self.lobby.phase != LobbyPhase::Lobby {
            return Err(EngineError::phase_violation("lobby", "playing|finished"));
        }
        if self.lobby.players.len() >= self.lobby.max_players {
            return Err(EngineError::Capacity { max: self.lobby.max_players });
        }
        if self.lobby.host.is_none() {
            self.lobby.host = Some(user.clone());
        }
        self.lobby.players.push(info);
        self.lobby.push_log(format!("{user} joined"));
        self.lobby.bump_version();
        Ok(())
    }

    fn handle_leave(&mut self, user: &UserId) -> EngineResult<()> {
        let before = self.lobby.players.len();
        self.lobby.players.retain(|p| &p.user_id != user);
        if self.lobby.players.len() == before {
            return Err(EngineError::NotFound);
        }
        if self.lobby.host.as_ref() == Some(user) {
            self.lobby.host = self.lobby.players.first().map(|p| p.user_id.clone());
        }
        self.lobby.push_log(format!("{user} left"));

        if self.lobby.players.is_empty() {
            if self.lobby.is_public {
                self.lobby.reset_public();
            } else {
                self.lobby.bump_version();
            }
        } else {
            self.lobby.bump_version();
        }
        Ok(())
    }

    /// Host-initiated, or (for public lobbies) any connected participant,
    /// per spec.md §3's "policy-equivalent" start rule.
    fn handle_start_game(&mut self, user: &UserId) -> EngineResult<()> {
        if self.lobby.phase != LobbyPhase::Lobby {
            return Err(EngineError::phase_violation("lobby", "playing|finished"));
        }
        let is_authorized = self.lobby.is_public || self.lobby.host.as_ref() == Some(user);
        if !is_authorized {
            return Err(EngineError::NotAuthorized);
        }

        let connected: Vec<PlayerInfo> = self
            .lobby
            .players
            .iter()
            .filter(|p| p.is_connected)
            .cloned()
            .collect();
        if connected.len() < 2 {
            return Err(EngineError::invalid_action("need at least 2 connected players"));
        }

        match &mut self.lobby.game {
            GameState::Poker(state) => {
                let roster = connected.into_iter().map(|info| (info, 1000)).collect();
                state.start_hand(roster, &mut self.rng)?;
            }
            GameState::Uno(state) => {
                state.start_game(connected, &mut self.rng)?;
            }
        }
        self.lobby.phase = LobbyPhase::Playing;
        self.lobby.reward_issued = false;
        self.lobby.push_log(format!("{user} started the game"));
        self.lobby.bump_version();
        Ok(())
    }

    async fn handle_player_action(&mut self, user: &UserId, command: PlayerCommand) -> EngineResult<()> {
        if self.lobby.phase != LobbyPhase::Playing {
            return Err(EngineError::phase_violation("playing", "lobby|finished"));
        }
        match (&mut self.lobby.game, command) {
            (GameState::Poker(state), PlayerCommand::Poker { action, amount }) => {
                let seat = state
                    .players
                    .iter()
                    .position(|p| &p.info.user_id == user)
                    .ok_or(EngineError::NotFound)?;
                state.apply_action(seat, action, amount)?;
                if state.street == crate::poker::Street::Showdown {
                    self.finish_poker_hand().await;
                }
            }
            (GameState::Uno(state), PlayerCommand::UnoPlay { card_id, chosen_color }) => {
                state.play(user, card_id, chosen_color, &mut self.rng)?;
                if state.winner.is_some() {
                    self.finish_uno_game().await;
                }
            }
            (GameState::Uno(state), PlayerCommand::UnoDraw) => {
                state.draw(user, &mut self.rng)?;
            }
            (GameState::Uno(state), PlayerCommand::UnoPass) => {
                state.pass(user)?;
            }
            (GameState::Uno(state), PlayerCommand::UnoCallUno) => {
                state.call_uno(user)?;
            }
            (GameState::Uno(state), PlayerCommand::UnoCatchUno) => {
                state.catch_uno(user, &mut self.rng)?;
            }
            _ => return Err(EngineError::invalid_action("action does not match this lobby's game")),
        }
        self.lobby.push_log(format!("{user} acted"));
        self.lobby.bump_version();
        Ok(())
    }

    async fn finish_poker_hand(&mut self) {
        let GameState::Poker(state) = &mut self.lobby.game else { return };
        let payouts = state.showdown();
        for (seat, amount) in &payouts {
            if let Some(player) = state.players.get_mut(*seat) {
                player.stack += amount;
            }
        }
        self.lobby.phase = LobbyPhase::Finished;
        if !self.lobby.reward_issued {
            if let Some((seat, amount)) = payouts.iter().max_by_key(|(_, a)| *a) {
                if let Some(player) = state.players.get(*seat) {
                    let winner = player.info.user_id.clone();
                    self.rewards
                        .issue(GameType::Poker, &self.lobby.code, &winner, RewardOutcome::PokerWin { pot_share: *amount })
                        .await;
                    self.lobby.celebration = Some(Celebration {
                        id: format!("{}-{}", self.lobby.code, state.hand_number),
                        winner_id: winner,
                        effect_id: "poker_win".to_string(),
                        created_at: chrono::Utc::now(),
                    });
                }
            }
            self.lobby.reward_issued = true;
        }
    }

    async fn finish_uno_game(&mut self) {
        let GameState::Uno(state) = &self.lobby.game else { return };
        let Some(winner) = state.winner.clone() else { return };
        self.lobby.phase = LobbyPhase::Finished;
        if !self.lobby.reward_issued {
            self.rewards
                .issue(GameType::Uno, &self.lobby.code, &winner, RewardOutcome::UnoWin)
                .await;
            self.lobby.celebration = Some(Celebration {
                id: format!("{}-uno-win", self.lobby.code),
                winner_id: winner,
                effect_id: "uno_win".to_string(),
                created_at: chrono::Utc::now(),
            });
            self.lobby.reward_issued = true;
        }
    }

    fn handle_end_lobby(&mut self, user: &UserId) -> EngineResult<()> {
        if self.lobby.is_public {
            return Err(EngineError::invalid_action("public lobbies cannot be ended"));
        }
        if self.lobby.host.as_ref() != Some(user) {
            return Err(EngineError::NotAuthorized);
        }
        self.lobby.players.clear();
        self.lobby.bump_version();
        Ok(())
    }

    fn handle_disconnect(&mut self, user: &UserId) -> EngineResult<()> {
        let player = self
            .lobby
            .players
            .iter_mut()
            .find(|p| &p.user_id == user)
            .ok_or(EngineError::NotFound)?;
        player.is_connected = false;
        player.last_seen = chrono::Utc::now();
        self.lobby.bump_version();
        Ok(())
    }

    /// Applies expired poker turn timers. UNO has no turn timer in this
    /// spec, so the tick is a no-op for UNO lobbies.
    fn tick(&mut self) {
        if self.lobby.phase != LobbyPhase::Playing {
            return;
        }
        if let GameState::Poker(state) = &mut self.lobby.game {
            if state.turn_expired(Instant::now()) && state.apply_turn_timeout().is_ok() {
                self.lobby.bump_version();
                self.broadcast();
            }
        }
    }
}
