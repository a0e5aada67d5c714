//! Ambient `metrics` facade counters for lobby and game activity.
//!
//! Grounded on the teacher's `pp_server::metrics` helper-function
//! pattern (one thin function per counter/gauge, `metrics::counter!`/
//! `metrics::gauge!` macro calls) but dropping the Prometheus exporter
//! entirely: this crate has no HTTP surface of its own, and the hosting
//! shell is free to install whatever `metrics` recorder it wants (or
//! none, in which case these calls are no-ops).

use crate::identity::GameType;

pub fn lobby_created(game_type: GameType, is_public: bool) {
    metrics::counter!("tablehall_lobbies_created_total",
        "game_type" => game_type.to_string(),
        "is_public" => is_public.to_string())
        .increment(1);
}

pub fn lobby_closed(game_type: GameType) {
    metrics::counter!("tablehall_lobbies_closed_total", "game_type" => game_type.to_string())
        .increment(1);
}

pub fn active_lobbies(game_type: GameType, count: u64) {
    metrics::gauge!("tablehall_active_lobbies", "game_type" => game_type.to_string()).set(count as f64);
}

pub fn hands_played(game_type: GameType) {
    metrics::counter!("tablehall_hands_played_total", "game_type" => game_type.to_string())
        .increment(1);
}

pub fn command_dispatched(command: &str, success: bool) {
    metrics::counter!("tablehall_commands_total",
        "command" => command.to_string(),
        "success" => success.to_string())
        .increment(1);
}

pub fn command_duration_ms(command: &str, duration_ms: f64) {
    metrics::histogram!("tablehall_command_duration_ms", "command" => command.to_string())
        .record(duration_ms);
}

pub fn reconnects_total(game_type: GameType) {
    metrics::counter!("tablehall_reconnects_total", "game_type" => game_type.to_string())
        .increment(1);
}
