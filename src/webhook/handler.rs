use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::error::AppError;
use crate::server::AppState;
use crate::session::start_call_session;
use crate::webhook::events::{room_name, to_room_event, JobAssignment};

fn auth_header(headers: &HeaderMap) -> Result<&str, StatusCode> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            StatusCode::UNAUTHORIZED
        })
}

/// Accept a job assignment and start its call session.
pub async fn handle_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let auth = match auth_header(&headers) {
        Ok(auth) => auth,
        Err(status) => return status,
    };

    if let Err(e) = state.verifier.verify_job(&body, auth) {
        tracing::warn!(error = %e, "Job signature verification failed");
        return StatusCode::UNAUTHORIZED;
    }

    let job: JobAssignment = match serde_json::from_slice(&body) {
        Ok(job) => job,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse job assignment");
            return StatusCode::BAD_REQUEST;
        }
    };

    if job.room.trim().is_empty() {
        tracing::warn!("Job assignment without a room");
        return StatusCode::BAD_REQUEST;
    }

    tracing::info!(room = %job.room, job_id = ?job.job_id, "Received job");

    if start_call_session(Arc::clone(&state), &job.room, &job.metadata).await {
        StatusCode::ACCEPTED
    } else {
        StatusCode::CONFLICT
    }
}

/// Route a room webhook to the session that owns the room.
pub async fn handle_livekit_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let auth = match auth_header(&headers) {
        Ok(auth) => auth,
        Err(status) => return status,
    };

    let Ok(body) = std::str::from_utf8(&body) else {
        tracing::error!("Webhook body is not UTF-8");
        return StatusCode::BAD_REQUEST;
    };

    let payload = match state.verifier.receive_webhook(body, auth) {
        Ok(payload) => payload,
        Err(AppError::Serialization(e)) => {
            tracing::error!(error = %e, "Failed to parse webhook payload");
            return StatusCode::BAD_REQUEST;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Webhook signature verification failed");
            return StatusCode::UNAUTHORIZED;
        }
    };

    let Some(room) = room_name(&payload) else {
        tracing::debug!(event = %payload.event, "Ignoring webhook without room");
        return StatusCode::OK;
    };

    let Some(event) = to_room_event(&payload, chrono::Utc::now()) else {
        tracing::debug!(event = %payload.event, room, "Ignoring webhook event");
        return StatusCode::OK;
    };

    if !state.sessions.route(room, event).await {
        tracing::debug!(event = %payload.event, room, "No live session for room");
    }

    StatusCode::OK
}
