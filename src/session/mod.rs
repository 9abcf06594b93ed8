pub mod events;
pub mod greeting;
pub mod handler;
pub mod metadata;
pub mod outcome;
pub mod recording;
pub mod registry;

use std::sync::Arc;

use crate::server::AppState;

use handler::CallSession;
use metadata::CallMetadata;

/// Start a call session for `room` in the background.
///
/// Returns false, without starting anything, if the room already has a live
/// session. The registry slot is released when the session ends.
pub async fn start_call_session(state: Arc<AppState>, room: &str, raw_metadata: &str) -> bool {
    let Some(events) = state.sessions.register(room).await else {
        tracing::warn!(room, "Session already running for room");
        return false;
    };

    let session = CallSession::new(
        room.to_string(),
        CallMetadata::parse(raw_metadata),
        Arc::clone(&state.platform),
        state.ledger.clone(),
        Arc::clone(&state.session_settings),
    );

    let room = room.to_string();
    tokio::spawn(async move {
        if let Err(e) = session.run(events).await {
            tracing::error!(room = %room, error = %e, "Call session failed");
        }
        state.sessions.remove(&room).await;
    });

    true
}
