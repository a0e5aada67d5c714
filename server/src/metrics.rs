//! Connection-level metrics for the hosting shell.
//!
//! Per-lobby and per-command counters live in [`tablehall::metrics`]
//! since the engine owns that activity; this module covers only what's
//! specific to the WebSocket transport layer itself. No Prometheus
//! exporter is installed here — whichever `metrics` recorder the
//! deployment wires up (or none) receives these calls.

#![allow(dead_code)]

/// Set current active WebSocket connection count.
pub fn websocket_connections_active(count: i64) {
    metrics::gauge!("tablehall_server_websocket_connections_active").set(count as f64);
}

/// Increment total WebSocket connections accepted.
pub fn websocket_connections_total() {
    metrics::counter!("tablehall_server_websocket_connections_total").increment(1);
}

/// Increment WebSocket messages sent to clients.
pub fn websocket_messages_sent() {
    metrics::counter!("tablehall_server_websocket_messages_sent").increment(1);
}

/// Increment WebSocket messages received from clients.
pub fn websocket_messages_received() {
    metrics::counter!("tablehall_server_websocket_messages_received").increment(1);
}
