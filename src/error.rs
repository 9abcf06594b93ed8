use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Spreadsheet API error: {0}")]
    Sheets(String),

    #[error("Spreadsheet authentication failed: {0}")]
    SheetsAuth(String),

    #[error("Voice platform API error: {0}")]
    Platform(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("Webhook verification failed: {0}")]
    WebhookVerification(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<livekit_api::services::ServiceError> for AppError {
    fn from(e: livekit_api::services::ServiceError) -> Self {
        AppError::Platform(e.to_string())
    }
}

impl From<livekit_api::access_token::AccessTokenError> for AppError {
    fn from(e: livekit_api::access_token::AccessTokenError) -> Self {
        AppError::WebhookVerification(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
