use chrono::{DateTime, Utc};
use livekit_protocol as proto;
use proto::participant_info::Kind;
use serde::Deserialize;

use crate::session::events::{Participant, ParticipantKind, RoomEvent};

/// Job handed to this worker: run a call session in `room`.
#[derive(Debug, Deserialize)]
pub struct JobAssignment {
    pub room: String,
    /// Raw dispatch metadata, passed through untouched.
    #[serde(default)]
    pub metadata: String,
    #[serde(default)]
    pub job_id: Option<String>,
}

pub fn room_name(event: &proto::WebhookEvent) -> Option<&str> {
    event
        .room
        .as_ref()
        .map(|r| r.name.as_str())
        .filter(|name| !name.is_empty())
}

fn to_participant(info: &proto::ParticipantInfo) -> Participant {
    let kind = match info.kind() {
        Kind::Ingress => ParticipantKind::Ingress,
        Kind::Egress => ParticipantKind::Egress,
        Kind::Sip => ParticipantKind::Sip,
        Kind::Agent => ParticipantKind::Agent,
        _ => ParticipantKind::Standard,
    };

    // Older servers omit the kind; SIP legs are recognizable by identity
    let kind = if kind == ParticipantKind::Standard && info.identity.starts_with("sip_") {
        ParticipantKind::Sip
    } else {
        kind
    };

    Participant {
        identity: info.identity.clone(),
        kind,
    }
}

/// The room event a webhook carries, if it is one sessions care about.
pub fn to_room_event(event: &proto::WebhookEvent, received_at: DateTime<Utc>) -> Option<RoomEvent> {
    let at = Some(event.created_at)
        .filter(|secs| *secs > 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(received_at);

    match event.event.as_str() {
        "participant_joined" => event.participant.as_ref().map(|p| RoomEvent::ParticipantJoined {
            participant: to_participant(p),
            at,
        }),
        "participant_left" => event.participant.as_ref().map(|p| RoomEvent::ParticipantLeft {
            participant: to_participant(p),
            at,
        }),
        "room_finished" => Some(RoomEvent::RoomFinished { at }),
        _ => None,
    }
}
