use base64::Engine;
use livekit_api::access_token::TokenVerifier;
use livekit_api::webhooks::{WebhookError, WebhookReceiver};
use livekit_protocol as proto;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

/// Checks platform request signatures.
///
/// The `Authorization` header carries a JWT signed with the API secret whose
/// `sha256` claim is the base64 SHA-256 digest of the body.
pub struct RequestVerifier {
    tokens: TokenVerifier,
    webhooks: WebhookReceiver,
}

impl RequestVerifier {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            tokens: TokenVerifier::with_api_key(api_key, api_secret),
            webhooks: WebhookReceiver::new(TokenVerifier::with_api_key(api_key, api_secret)),
        }
    }

    /// Verify a signed job assignment body.
    pub fn verify_job(&self, body: &[u8], auth_header: &str) -> Result<()> {
        let token = bearer_token(auth_header)?;
        let claims = self.tokens.verify(token)?;

        if claims.sha256.is_empty() {
            return Err(AppError::WebhookVerification("Token has no body digest".to_string()));
        }
        if body_digest(body) != claims.sha256 {
            return Err(AppError::WebhookVerification("Body digest mismatch".to_string()));
        }

        Ok(())
    }

    /// Verify and decode a room webhook. A body that verifies but does not
    /// decode is reported as `AppError::Serialization`.
    pub fn receive_webhook(&self, body: &str, auth_header: &str) -> Result<proto::WebhookEvent> {
        let token = bearer_token(auth_header)?;

        self.webhooks.receive(body, token).map_err(|e| match e {
            WebhookError::InvalidData(e) => AppError::Serialization(e),
            other => AppError::WebhookVerification(other.to_string()),
        })
    }
}

fn bearer_token(auth_header: &str) -> Result<&str> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .unwrap_or(auth_header)
        .trim();

    if token.is_empty() {
        return Err(AppError::WebhookVerification("Empty token".to_string()));
    }
    Ok(token)
}

pub fn body_digest(body: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(Sha256::digest(body))
}

#[cfg(test)]
pub(crate) fn sign_body(api_key: &str, api_secret: &str, body: &[u8]) -> String {
    livekit_api::access_token::AccessToken::with_api_key(api_key, api_secret)
        .with_sha256(&body_digest(body))
        .to_jwt()
        .unwrap()
}
