use std::sync::Arc;
use std::time::Duration;

use tokio::signal;

use crate::server::AppState;

/// Wait for a shutdown signal (SIGINT or SIGTERM).
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

/// Stop every live call session and wait, up to the configured shutdown
/// timeout, for them to finish. Interrupted rows keep their IN_PROGRESS
/// status. Returns false if some sessions were still live at the deadline.
pub async fn graceful_shutdown(state: &Arc<AppState>) -> bool {
    tracing::info!("Starting graceful shutdown...");

    let rooms = state.sessions.active_rooms().await;
    if rooms.is_empty() {
        tracing::info!("No live call sessions");
        return true;
    }

    let signalled = state.sessions.shutdown_all().await;
    tracing::warn!(
        count = signalled,
        rooms = ?rooms,
        "Interrupted live call sessions"
    );

    let timeout = Duration::from_secs(state.config.server.shutdown_timeout_secs);
    if !state.sessions.wait_idle(timeout).await {
        let remaining = state.sessions.active_rooms().await;
        tracing::error!(
            rooms = ?remaining,
            timeout_secs = timeout.as_secs(),
            "Call sessions still running at shutdown deadline"
        );
        return false;
    }

    tracing::info!("Graceful shutdown complete");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::start_call_session;
    use crate::sheets::types::CallStatus;
    use crate::sheets::StatusLedger;
    use crate::testing::*;

    fn state() -> Arc<AppState> {
        let sheet = Arc::new(FakeSheet::with_items(vec![work_item(
            3,
            "sItA",
            "919999999999",
            "Cataract",
            CallStatus::InProgress,
        )]));
        let ledger = StatusLedger::with_columns(sheet, STATUS_COLUMN, RECORDING_COLUMN);
        Arc::new(AppState::with_parts(test_config(), Arc::new(FakePlatform::default()), ledger).unwrap())
    }

    #[tokio::test]
    async fn test_waits_for_sessions_to_finish() {
        let state = state();
        let metadata = r#"{"phone_number":"+919999999999","sheet_row":3}"#;
        assert!(start_call_session(Arc::clone(&state), "call-919999999999-1", metadata).await);

        assert!(graceful_shutdown(&state).await);
        assert!(state.sessions.active_rooms().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_on_stuck_sessions() {
        let state = state();
        // Registered but never drained: nothing will remove it
        let _events = state.sessions.register("call-stuck").await.unwrap();

        assert!(!graceful_shutdown(&state).await);
        assert_eq!(state.sessions.active_rooms().await, vec!["call-stuck"]);
    }

    #[tokio::test]
    async fn test_nothing_to_drain() {
        assert!(graceful_shutdown(&state()).await);
    }
}
