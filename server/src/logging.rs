//! Structured logging configuration.
//!
//! Provides request/command correlation and performance metrics on top of
//! `tracing`, configurable via the `RUST_LOG` env var.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// # Example
///
/// ```no_run
/// use tablehall_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a slow or routine operation's duration.
///
/// # Example
///
/// ```
/// use tablehall_server::logging::log_performance;
///
/// log_performance("shuffle_deck", 2, None);
/// ```
#[allow(dead_code)]
pub fn log_performance(operation: &str, duration_ms: u64, metadata: Option<&str>) {
    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "PERFORMANCE: slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "performance metric"
        );
    }
}

/// Log a dispatched command and its outcome.
///
/// # Example
///
/// ```
/// use tablehall_server::logging::log_command;
///
/// log_command("player_action", true, 3, Some("u1"));
/// ```
#[allow(dead_code)]
pub fn log_command(command: &str, success: bool, duration_ms: u64, user_id: Option<&str>) {
    tracing::info!(
        command = command,
        success = success,
        duration_ms = duration_ms,
        user_id = user_id,
        "command dispatched"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_performance() {
        log_performance("test_operation", 500, Some("metadata"));
        log_performance("slow_operation", 2000, None);
    }

    #[test]
    fn test_log_performance_boundary() {
        log_performance("boundary", 1000, None);
        log_performance("just_over", 1001, Some("just slow"));
    }

    #[test]
    fn test_log_command() {
        log_command("create_lobby", true, 1, Some("u1"));
        log_command("join_lobby", false, 5, None);
    }

    #[test]
    fn test_log_functions_with_empty_strings() {
        log_performance("", 0, Some(""));
        log_command("", true, 0, Some(""));
    }

    #[test]
    fn test_log_functions_with_very_long_strings() {
        let long_string = "x".repeat(1000);
        log_performance(&long_string, 100, Some(&long_string));
        log_command(&long_string, false, 100, Some(&long_string));
    }

    #[test]
    fn test_multiple_concurrent_logs() {
        for i in 0..10u64 {
            log_performance("concurrent", i * 100, None);
            log_command("concurrent", i % 2 == 0, i * 10, Some("u1"));
        }
    }
}
