use super::TokenId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side record backing one refresh token.
///
/// `id` is the refresh token's payload id. `is_blocked` only ever moves
/// from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: TokenId,
    pub subject: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: TokenId, subject: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Session {
            id,
            subject: subject.into(),
            is_blocked: false,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
