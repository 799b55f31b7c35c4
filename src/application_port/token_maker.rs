use crate::domain_model::{Payload, PayloadError};
use chrono::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is invalid")]
    InvalidToken,
    #[error("token has expired")]
    TokenExpired,
    #[error("invalid key size: {0}")]
    InvalidKey(String),
    #[error("failed to create token: {0}")]
    Creation(String),
}

impl From<PayloadError> for TokenError {
    fn from(error: PayloadError) -> Self {
        TokenError::Creation(error.to_string())
    }
}

/// Mints and verifies bearer tokens under one immutable key.
///
/// Verification is all-or-nothing: a payload is returned only when the
/// token is authentic and not expired.
pub trait TokenMaker: Send + Sync {
    fn create_token(&self, subject: &str, duration: Duration)
    -> Result<(String, Payload), TokenError>;

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;
}
