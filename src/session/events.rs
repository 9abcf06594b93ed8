use chrono::{DateTime, Utc};

/// Kind of a room participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Standard,
    Ingress,
    Egress,
    Sip,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub identity: String,
    pub kind: ParticipantKind,
}

impl Participant {
    pub fn is_sip(&self) -> bool {
        self.kind == ParticipantKind::Sip
    }
}

/// What a call session hears about its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    ParticipantJoined {
        participant: Participant,
        at: DateTime<Utc>,
    },
    ParticipantLeft {
        participant: Participant,
        at: DateTime<Utc>,
    },
    RoomFinished {
        at: DateTime<Utc>,
    },
    /// The worker is stopping.
    Shutdown,
}
