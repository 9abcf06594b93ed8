use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use tokio::sync::mpsc;

use crate::config::{AppConfig, StorageConfig};
use crate::error::{AppError, Result};
use crate::livekit::{OutboundCall, VoicePlatform};
use crate::sheets::StatusLedger;

use super::events::RoomEvent;
use super::greeting::{render_greeting, say_message};
use super::metadata::CallMetadata;
use super::outcome::{CallOutcome, SipLifecycle};
use super::recording::RecordingTarget;

/// Worker-wide settings shared by every call session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub outbound_trunk_id: String,
    pub min_success_duration: Duration,
    pub max_call_duration: Duration,
    pub greeting_template: String,
    pub default_patient_name: String,
    pub greeting_topic: String,
    pub local_offset: FixedOffset,
    pub storage: Option<StorageConfig>,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let local_offset = FixedOffset::east_opt(config.session.utc_offset_minutes * 60)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "session.utc_offset_minutes out of range: {}",
                    config.session.utc_offset_minutes
                ))
            })?;

        Ok(Self {
            outbound_trunk_id: config.sip.outbound_trunk_id.clone(),
            min_success_duration: Duration::from_secs(config.session.min_success_duration_secs),
            max_call_duration: Duration::from_secs(config.session.max_call_duration_secs),
            greeting_template: config.session.greeting_template.clone(),
            default_patient_name: config.session.default_patient_name.clone(),
            greeting_topic: config.session.greeting_topic.clone(),
            local_offset,
            storage: config.storage.clone(),
        })
    }
}

/// How a session came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The SIP leg finished and its outcome was recorded.
    Classified(CallOutcome),
    /// The SIP leg could not be originated; the row was marked FAILED.
    OriginationFailed,
    /// The room closed with nothing to classify.
    RoomClosed,
    /// The session outlived the maximum call duration.
    TimedOut,
    /// The worker asked the session to stop.
    Shutdown,
}

/// One dispatched call, from recording start to outcome write-back.
pub struct CallSession {
    room: String,
    metadata: CallMetadata,
    platform: Arc<dyn VoicePlatform>,
    ledger: StatusLedger,
    settings: Arc<SessionSettings>,
}

impl CallSession {
    pub fn new(
        room: String,
        metadata: CallMetadata,
        platform: Arc<dyn VoicePlatform>,
        ledger: StatusLedger,
        settings: Arc<SessionSettings>,
    ) -> Self {
        Self {
            room,
            metadata,
            platform,
            ledger,
            settings,
        }
    }

    /// Drive the call until it can be classified, the room closes, or the
    /// session is stopped. Only spreadsheet write failures surface as errors.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<RoomEvent>) -> Result<SessionEnd> {
        tracing::info!(
            room = %self.room,
            outbound = self.metadata.is_outbound(),
            row = ?self.metadata.sheet_row,
            "Call session started"
        );

        self.start_recording().await;

        if let Some(phone) = self.metadata.phone_number.as_deref() {
            if let Err(e) = self.originate(phone).await {
                tracing::error!(room = %self.room, phone, error = %e, "SIP origination failed");
                self.record(CallOutcome::Failed).await?;
                return Ok(SessionEnd::OriginationFailed);
            }
        }

        self.greet().await;

        let mut lifecycle = SipLifecycle::new(self.settings.min_success_duration);
        let deadline = tokio::time::sleep(self.settings.max_call_duration);
        tokio::pin!(deadline);

        let end = loop {
            let event = tokio::select! {
                event = events.recv() => event,
                _ = &mut deadline => {
                    tracing::warn!(room = %self.room, "Call session hit maximum duration");
                    break SessionEnd::TimedOut;
                }
            };

            match event {
                Some(RoomEvent::ParticipantJoined { participant, at }) if participant.is_sip() => {
                    tracing::info!(room = %self.room, identity = %participant.identity, "SIP participant connected");
                    lifecycle.on_join(at);
                }
                Some(RoomEvent::ParticipantLeft { participant, at }) if participant.is_sip() => {
                    tracing::info!(room = %self.room, identity = %participant.identity, "SIP participant disconnected");
                    let outcome = lifecycle.on_leave(at);
                    self.record(outcome).await?;
                    break SessionEnd::Classified(outcome);
                }
                Some(RoomEvent::ParticipantJoined { participant, .. })
                | Some(RoomEvent::ParticipantLeft { participant, .. }) => {
                    tracing::debug!(room = %self.room, identity = %participant.identity, "Ignoring non-SIP participant");
                }
                Some(RoomEvent::RoomFinished { at }) => {
                    // The SIP leg cannot outlive the room
                    if self.metadata.is_outbound() || lifecycle.has_joined() {
                        let outcome = lifecycle.on_leave(at);
                        self.record(outcome).await?;
                        break SessionEnd::Classified(outcome);
                    }
                    break SessionEnd::RoomClosed;
                }
                Some(RoomEvent::Shutdown) | None => break SessionEnd::Shutdown,
            }
        };

        tracing::info!(room = %self.room, end = ?end, "Call session closed");
        Ok(end)
    }

    /// Best-effort: failures are logged and the call goes on unrecorded.
    async fn start_recording(&self) {
        let Some(storage) = self.settings.storage.as_ref() else {
            tracing::debug!(room = %self.room, "No storage configured, not recording");
            return;
        };

        let now = chrono::Utc::now().with_timezone(&self.settings.local_offset);
        let target = RecordingTarget::for_room(storage, &self.room, now);

        match self
            .platform
            .start_recording(&self.room, target.file_output(storage))
            .await
        {
            Ok(egress) => {
                tracing::info!(room = %self.room, egress_id = %egress.egress_id, url = %target.public_url, "Recording started");
                if let Some(row) = self.metadata.sheet_row {
                    if let Err(e) = self.ledger.set_recording_link(row, &target.public_url).await {
                        tracing::warn!(room = %self.room, row, error = %e, "Failed to write recording link");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(room = %self.room, error = %e, "Failed to start recording");
            }
        }
    }

    async fn originate(&self, phone: &str) -> Result<()> {
        let call = OutboundCall {
            trunk_id: self.settings.outbound_trunk_id.clone(),
            call_to: phone.to_string(),
            room_name: self.room.clone(),
            participant_identity: format!("sip_{phone}"),
        };

        let info = self.platform.create_sip_participant(&call).await?;
        tracing::info!(room = %self.room, participant_id = %info.participant_id, "Dialing");
        Ok(())
    }

    async fn greet(&self) {
        let patient = self
            .metadata
            .patient_name_or(&self.settings.default_patient_name);
        let text = render_greeting(&self.settings.greeting_template, patient);

        let result = match say_message(&self.room, &self.settings.greeting_topic, &text) {
            Ok(message) => self.platform.send_data(&message).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            tracing::warn!(room = %self.room, error = %e, "Failed to send greeting");
        }
    }

    async fn record(&self, outcome: CallOutcome) -> Result<()> {
        match self.metadata.sheet_row {
            Some(row) => {
                tracing::info!(room = %self.room, row, outcome = ?outcome, "Recording call outcome");
                self.ledger.set_status(row, &outcome.status()).await
            }
            None => {
                tracing::info!(room = %self.room, outcome = ?outcome, "Call outcome (no sheet row)");
                Ok(())
            }
        }
    }
}
