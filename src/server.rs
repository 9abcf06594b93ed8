use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::livekit::{LiveKitClient, VoicePlatform};
use crate::session::handler::SessionSettings;
use crate::session::registry::SessionRegistry;
use crate::sheets::google::GoogleSheets;
use crate::sheets::StatusLedger;
use crate::webhook::signature::RequestVerifier;

pub struct AppState {
    pub config: AppConfig,
    pub platform: Arc<dyn VoicePlatform>,
    pub ledger: StatusLedger,
    pub session_settings: Arc<SessionSettings>,
    pub sessions: SessionRegistry,
    pub verifier: RequestVerifier,
}

impl AppState {
    pub fn new(config: AppConfig) -> crate::error::Result<Self> {
        let platform = Arc::new(LiveKitClient::new(&config.livekit));
        let sheet = Arc::new(GoogleSheets::new(&config.sheets)?);
        let ledger = StatusLedger::new(sheet, &config.sheets);

        Self::with_parts(config, platform, ledger)
    }

    pub fn with_parts(
        config: AppConfig,
        platform: Arc<dyn VoicePlatform>,
        ledger: StatusLedger,
    ) -> crate::error::Result<Self> {
        let session_settings = Arc::new(SessionSettings::from_config(&config)?);
        let verifier = RequestVerifier::new(&config.livekit.api_key, &config.livekit.api_secret);

        Ok(Self {
            config,
            platform,
            ledger,
            session_settings,
            sessions: SessionRegistry::new(),
            verifier,
        })
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/jobs", post(crate::webhook::handler::handle_job))
        .route(
            "/webhooks/livekit",
            post(crate::webhook::handler::handle_livekit_webhook),
        )
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}
