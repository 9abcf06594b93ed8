pub mod client;

use async_trait::async_trait;
use livekit_protocol as proto;

use crate::error::Result;

pub use client::LiveKitClient;

/// SIP leg to originate into a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    pub trunk_id: String,
    /// `+` and digits.
    pub call_to: String,
    pub room_name: String,
    pub participant_identity: String,
}

/// Reliable data message for every participant in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessage {
    pub room: String,
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Server-side API of the voice-agent platform.
#[async_trait]
pub trait VoicePlatform: Send + Sync {
    /// Ask the platform to start an agent job in a room.
    async fn create_dispatch(
        &self,
        request: proto::CreateAgentDispatchRequest,
    ) -> Result<proto::AgentDispatch>;

    /// Originate a SIP call leg into a room. Returns without waiting for an answer.
    async fn create_sip_participant(&self, call: &OutboundCall) -> Result<proto::SipParticipantInfo>;

    /// Start an audio-only export of the whole room to `output`.
    async fn start_recording(
        &self,
        room: &str,
        output: proto::EncodedFileOutput,
    ) -> Result<proto::EgressInfo>;

    async fn send_data(&self, message: &RoomMessage) -> Result<()>;
}
