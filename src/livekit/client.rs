use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use livekit_api::services::agent_dispatch::AgentDispatchClient;
use livekit_api::services::egress::{EgressClient, EgressOutput, RoomCompositeOptions};
use livekit_api::services::room::{RoomClient, SendDataOptions};
use livekit_api::services::sip::{CreateSIPParticipantOptions, SIPClient};
use livekit_api::services::ServiceResult;
use livekit_protocol as proto;

use crate::config::LiveKitConfig;
use crate::error::{AppError, Result};

use super::{OutboundCall, RoomMessage, VoicePlatform};

/// Service clients for the platform's server API, one per service.
pub struct LiveKitClient {
    dispatch: AgentDispatchClient,
    sip: SIPClient,
    egress: EgressClient,
    room: RoomClient,
    request_timeout: Duration,
}

impl LiveKitClient {
    pub fn new(config: &LiveKitConfig) -> Self {
        let host = http_base_url(&config.url);
        let (key, secret) = (config.api_key.as_str(), config.api_secret.as_str());

        Self {
            dispatch: AgentDispatchClient::with_api_key(&host, key, secret),
            sip: SIPClient::with_api_key(&host, key, secret),
            egress: EgressClient::with_api_key(&host, key, secret),
            room: RoomClient::with_api_key(&host, key, secret),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Bound a service call by the configured request timeout.
    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = ServiceResult<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AppError::Platform(format!(
                "{operation} timed out after {}s",
                self.request_timeout.as_secs()
            ))),
        }
    }
}

/// Server API calls go over HTTP even when configured with the ws(s) URL.
fn http_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        url.to_string()
    }
}

#[async_trait]
impl VoicePlatform for LiveKitClient {
    async fn create_dispatch(
        &self,
        request: proto::CreateAgentDispatchRequest,
    ) -> Result<proto::AgentDispatch> {
        self.bounded("CreateDispatch", self.dispatch.create_dispatch(request))
            .await
    }

    async fn create_sip_participant(&self, call: &OutboundCall) -> Result<proto::SipParticipantInfo> {
        let options = CreateSIPParticipantOptions {
            participant_identity: call.participant_identity.clone(),
            ..Default::default()
        };

        self.bounded(
            "CreateSIPParticipant",
            self.sip.create_sip_participant(
                call.trunk_id.clone(),
                call.call_to.clone(),
                call.room_name.clone(),
                options,
                None,
            ),
        )
        .await
    }

    async fn start_recording(
        &self,
        room: &str,
        output: proto::EncodedFileOutput,
    ) -> Result<proto::EgressInfo> {
        let options = RoomCompositeOptions {
            audio_only: true,
            ..Default::default()
        };

        self.bounded(
            "StartRoomCompositeEgress",
            self.egress
                .start_room_composite_egress(room, vec![EgressOutput::File(output)], options),
        )
        .await
    }

    async fn send_data(&self, message: &RoomMessage) -> Result<()> {
        let options = SendDataOptions {
            kind: proto::data_packet::Kind::Reliable,
            topic: Some(message.topic.clone()),
            ..Default::default()
        };

        self.bounded(
            "SendData",
            self.room
                .send_data(&message.room, message.payload.clone(), options),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_base_url() {
        assert_eq!(http_base_url("wss://voice.example.com/"), "https://voice.example.com");
        assert_eq!(http_base_url("ws://localhost:7880"), "http://localhost:7880");
        assert_eq!(http_base_url("https://voice.example.com"), "https://voice.example.com");
    }

    #[tokio::test]
    async fn test_unreachable_server_times_out() {
        let client = LiveKitClient {
            request_timeout: Duration::from_millis(20),
            ..LiveKitClient::new(&crate::testing::test_config().livekit)
        };

        let result = client
            .bounded("Stalled", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Stalled timed out"));
    }
}
