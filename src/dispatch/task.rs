use livekit_protocol as proto;
use rand::Rng;

use crate::error::{AppError, Result};
use crate::livekit::VoicePlatform;
use crate::session::metadata::{normalize_phone, CallMetadata};

use super::selection::DispatchJob;

/// Fresh room for one call: `call-{digits}-{NNNN}`.
///
/// The four-digit suffix makes repeat calls to one number land in different
/// rooms; collisions are possible and tolerated.
pub fn room_name(phone_digits: &str) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("call-{phone_digits}-{suffix}")
}

/// Build the dispatch for a selected row.
pub fn build_request(job: &DispatchJob, agent_name: &str) -> Result<proto::CreateAgentDispatchRequest> {
    let phone = normalize_phone(&job.phone_number).ok_or_else(|| {
        AppError::Dispatch(format!("row {} has no usable phone number", job.row))
    })?;
    let digits = phone.trim_start_matches('+');

    let metadata = CallMetadata::outbound(phone.clone(), job.patient_name.clone(), job.row);

    Ok(proto::CreateAgentDispatchRequest {
        agent_name: agent_name.to_string(),
        room: room_name(digits),
        metadata: metadata.to_json()?,
        ..Default::default()
    })
}

/// Ask the platform to start the call agent for one row.
pub async fn place_call(
    platform: &dyn VoicePlatform,
    job: &DispatchJob,
    agent_name: &str,
) -> Result<proto::AgentDispatch> {
    let request = build_request(job, agent_name)?;

    tracing::info!(
        row = job.row,
        patient = %job.patient_name,
        phone = %job.phone_number,
        room = %request.room,
        "Calling patient"
    );

    platform.create_dispatch(request).await
}
