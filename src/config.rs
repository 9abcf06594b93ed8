use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub livekit: LiveKitConfig,
    #[serde(default)]
    pub sip: SipConfig,
    pub sheets: SheetsConfig,
    pub storage: Option<StorageConfig>,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// How long shutdown waits for interrupted sessions to finish.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct LiveKitConfig {
    /// HTTP(S) base URL of the platform server API.
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// Manual Debug impl to avoid leaking the API secret
impl std::fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("agent_name", &self.agent_name)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SipConfig {
    /// Outbound trunk used to originate calls. Required by the worker.
    #[serde(default)]
    pub outbound_trunk_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub service_account_key_path: PathBuf,
    /// Worksheet title. The first worksheet is used when unset.
    pub worksheet: Option<String>,
    #[serde(default = "default_header_rows")]
    pub header_rows: u32,
    #[serde(default = "default_status_column")]
    pub status_column: u32,
    #[serde(default = "default_recording_column")]
    pub recording_column: u32,
    #[serde(default)]
    pub headers: SheetHeaders,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Header names used to pick fields out of each record.
#[derive(Debug, Deserialize, Clone)]
pub struct SheetHeaders {
    #[serde(default = "default_patient_name_header")]
    pub patient_name: String,
    #[serde(default = "default_phone_number_header")]
    pub phone_number: String,
    #[serde(default = "default_call_status_header")]
    pub call_status: String,
    #[serde(default = "default_operation_type_header")]
    pub operation_type: String,
}

impl Default for SheetHeaders {
    fn default() -> Self {
        Self {
            patient_name: default_patient_name_header(),
            phone_number: default_phone_number_header(),
            call_status: default_call_status_header(),
            operation_type: default_operation_type_header(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Overrides the `https://{bucket}.s3.{region}.amazonaws.com` link base.
    pub public_base_url: Option<String>,
}

// Manual Debug impl to avoid leaking the storage secret
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret", &"[REDACTED]")
            .field("key_prefix", &self.key_prefix)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_max_concurrent_calls")]
    pub max_concurrent_calls: usize,
    #[serde(default = "default_call_gap_seconds")]
    pub call_gap_seconds: u64,
    #[serde(default = "default_target_operation_type")]
    pub target_operation_type: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: default_max_concurrent_calls(),
            call_gap_seconds: default_call_gap_seconds(),
            target_operation_type: default_target_operation_type(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_min_success_duration")]
    pub min_success_duration_secs: u64,
    #[serde(default = "default_max_call_duration")]
    pub max_call_duration_secs: u64,
    /// Greeting text; `{patient}` is replaced with the patient's name.
    #[serde(default = "default_greeting_template")]
    pub greeting_template: String,
    #[serde(default = "default_patient_name")]
    pub default_patient_name: String,
    #[serde(default = "default_greeting_topic")]
    pub greeting_topic: String,
    /// Offset from UTC used for recording timestamps.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_success_duration_secs: default_min_success_duration(),
            max_call_duration_secs: default_max_call_duration(),
            greeting_template: default_greeting_template(),
            default_patient_name: default_patient_name(),
            greeting_topic: default_greeting_topic(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_agent_name() -> String {
    "reminder-caller".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_header_rows() -> u32 {
    1
}

fn default_status_column() -> u32 {
    4
}

fn default_recording_column() -> u32 {
    5
}

fn default_patient_name_header() -> String {
    "Patient_name".to_string()
}

fn default_phone_number_header() -> String {
    "Phone_number".to_string()
}

fn default_call_status_header() -> String {
    "Call_status".to_string()
}

fn default_operation_type_header() -> String {
    "Operation_type".to_string()
}

fn default_key_prefix() -> String {
    "recordings".to_string()
}

fn default_max_concurrent_calls() -> usize {
    2
}

fn default_call_gap_seconds() -> u64 {
    10
}

fn default_target_operation_type() -> String {
    "Cataract".to_string()
}

fn default_min_success_duration() -> u64 {
    60
}

fn default_max_call_duration() -> u64 {
    30 * 60
}

fn default_greeting_template() -> String {
    "नमस्कार जी। मैं सुष्रुत आई हॉस्पिटल से बात कर रही हूँ। क्या मेरी बात {patient} जी से हो रही है, "
        .to_string()
}

fn default_patient_name() -> String {
    "जी".to_string()
}

fn default_greeting_topic() -> String {
    "agent.say".to_string()
}

fn default_utc_offset_minutes() -> i32 {
    5 * 60 + 30 // Asia/Kolkata
}

/// Calls in flight must fit the admission semaphore: at least one, at most
/// `Semaphore::MAX_PERMITS`.
pub fn check_max_concurrent(n: usize) -> std::result::Result<usize, String> {
    let max = tokio::sync::Semaphore::MAX_PERMITS;
    if n == 0 || n > max {
        return Err(format!("must be between 1 and {max}, got {n}"));
    }
    Ok(n)
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(
                config::File::with_name("reminder-caller")
                    .required(false),
            );
        }

        // Environment variable overrides with REMINDER_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("REMINDER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let config: AppConfig = config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        check_max_concurrent(config.dispatch.max_concurrent_calls).map_err(|e| {
            AppError::Config(format!("dispatch.max_concurrent_calls {e}"))
        })?;

        Ok(config)
    }

    /// Checks the settings only the call worker needs.
    pub fn validate_for_worker(&self) -> Result<()> {
        if self.sip.outbound_trunk_id.trim().is_empty() {
            return Err(AppError::Config(
                "sip.outbound_trunk_id is required to place outbound calls".to_string(),
            ));
        }
        Ok(())
    }
}
