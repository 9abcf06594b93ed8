//! In-memory stand-ins for the spreadsheet and the voice platform.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use livekit_protocol as proto;
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::livekit::{OutboundCall, RoomMessage, VoicePlatform};
use crate::sheets::types::{CallStatus, WorkItem};
use crate::sheets::Spreadsheet;

pub const STATUS_COLUMN: u32 = 4;
pub const RECORDING_COLUMN: u32 = 5;

#[derive(Default)]
pub struct FakeSheet {
    pub items: Mutex<Vec<WorkItem>>,
    pub writes: Mutex<Vec<(u32, u32, String)>>,
    /// Clock reading at each IN_PROGRESS write, in write order.
    pub claimed_at: Mutex<Vec<(u32, Instant)>>,
    pub fail_writes: bool,
}

impl FakeSheet {
    pub fn with_items(items: Vec<WorkItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    pub fn status_of(&self, row: u32) -> Option<CallStatus> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.row == row)
            .map(|item| item.status.clone())
    }

    pub fn writes_to(&self, column: u32) -> Vec<(u32, String)> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, c, _)| *c == column)
            .map(|(row, _, value)| (*row, value.clone()))
            .collect()
    }

    pub fn claim_times(&self) -> Vec<Instant> {
        self.claimed_at.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl Spreadsheet for FakeSheet {
    async fn fetch_work_items(&self) -> Result<Vec<WorkItem>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn update_cell(&self, row: u32, column: u32, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(AppError::Sheets("write rejected".to_string()));
        }

        self.writes
            .lock()
            .unwrap()
            .push((row, column, value.to_string()));

        if column == STATUS_COLUMN {
            let status = CallStatus::parse(value);
            if status == CallStatus::InProgress {
                self.claimed_at.lock().unwrap().push((row, Instant::now()));
            }
            if let Some(item) = self.items.lock().unwrap().iter_mut().find(|i| i.row == row) {
                item.status = status;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakePlatform {
    pub dispatches: Mutex<Vec<proto::CreateAgentDispatchRequest>>,
    pub sip_calls: Mutex<Vec<OutboundCall>>,
    pub recordings: Mutex<Vec<(String, proto::EncodedFileOutput)>>,
    pub messages: Mutex<Vec<RoomMessage>>,
    pub fail_dispatch: bool,
    pub fail_sip: bool,
    pub fail_egress: bool,
    /// Time each dispatch call spends "on the wire".
    pub dispatch_latency: Duration,
    pub active: AtomicUsize,
    pub peak: AtomicUsize,
}

impl FakePlatform {
    /// Most dispatch calls observed in flight at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn dispatched_rooms(&self) -> Vec<String> {
        self.dispatches
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.room.clone())
            .collect()
    }
}

#[async_trait]
impl VoicePlatform for FakePlatform {
    async fn create_dispatch(
        &self,
        request: proto::CreateAgentDispatchRequest,
    ) -> Result<proto::AgentDispatch> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.dispatch_latency).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_dispatch {
            return Err(AppError::Platform("dispatch refused".to_string()));
        }

        let dispatch = proto::AgentDispatch {
            id: format!("AD_{}", request.room),
            agent_name: request.agent_name.clone(),
            room: request.room.clone(),
            ..Default::default()
        };
        self.dispatches.lock().unwrap().push(request);
        Ok(dispatch)
    }

    async fn create_sip_participant(&self, call: &OutboundCall) -> Result<proto::SipParticipantInfo> {
        self.sip_calls.lock().unwrap().push(call.clone());
        if self.fail_sip {
            return Err(AppError::Platform("trunk unavailable".to_string()));
        }
        Ok(proto::SipParticipantInfo {
            participant_id: "PA_sip".to_string(),
            participant_identity: call.participant_identity.clone(),
            room_name: call.room_name.clone(),
            sip_call_id: "SCL_1".to_string(),
            ..Default::default()
        })
    }

    async fn start_recording(
        &self,
        room: &str,
        output: proto::EncodedFileOutput,
    ) -> Result<proto::EgressInfo> {
        if self.fail_egress {
            return Err(AppError::Platform("egress unavailable".to_string()));
        }
        self.recordings.lock().unwrap().push((room.to_string(), output));
        Ok(proto::EgressInfo {
            egress_id: "EG_1".to_string(),
            room_name: room.to_string(),
            ..Default::default()
        })
    }

    async fn send_data(&self, message: &RoomMessage) -> Result<()> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn work_item(row: u32, name: &str, phone: &str, operation_type: &str, status: CallStatus) -> WorkItem {
    WorkItem {
        row,
        patient_name: name.to_string(),
        phone_number: phone.to_string(),
        operation_type: operation_type.to_string(),
        status,
    }
}

pub const TEST_API_KEY: &str = "APItest";
pub const TEST_API_SECRET: &str = "test-secret";

/// Worker configuration loaded the same way the binaries load it.
pub fn test_config() -> AppConfig {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
[livekit]
url = "https://voice.example.com"
api_key = "{TEST_API_KEY}"
api_secret = "{TEST_API_SECRET}"

[sip]
outbound_trunk_id = "ST_trunk"

[sheets]
spreadsheet_id = "sheet-id"
service_account_key_path = "/keys/service-account.json"
"#
    )
    .unwrap();

    AppConfig::load(file.path().to_str()).unwrap()
}
