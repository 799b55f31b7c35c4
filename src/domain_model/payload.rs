use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one issued token. Doubles as the session key for refresh tokens.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub uuid::Uuid);

impl TokenId {
    /// Draws 128 bits from the OS generator and stamps them as a v4 uuid.
    pub fn generate() -> Result<Self, TokenIdError> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenIdError(e.to_string()))?;
        Ok(TokenId(uuid::Builder::from_random_bytes(bytes).into_uuid()))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TokenId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(TokenId)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to generate token id: {0}")]
pub struct TokenIdError(String);

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error(transparent)]
    TokenId(#[from] TokenIdError),
    #[error("expiry is out of the representable time range")]
    ExpiryOutOfRange,
}

/// Claims carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub id: TokenId,
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    /// A negative `duration` is accepted and yields an already expired payload.
    pub fn new(subject: impl Into<String>, duration: Duration) -> Result<Self, PayloadError> {
        let id = TokenId::generate()?;
        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(duration)
            .ok_or(PayloadError::ExpiryOutOfRange)?;
        Ok(Payload {
            id,
            subject: subject.into(),
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_payload_spans_duration() {
        let payload = Payload::new("u1", Duration::minutes(15)).unwrap();
        assert_eq!(payload.subject, "u1");
        assert_eq!(payload.expires_at - payload.issued_at, Duration::minutes(15));
        assert_eq!(payload.id.0.get_version_num(), 4);
    }

    #[test]
    fn negative_duration_is_accepted() {
        let payload = Payload::new("u1", Duration::minutes(-1)).unwrap();
        assert!(payload.expires_at < payload.issued_at);
    }

    #[test]
    fn overflowing_expiry_is_an_error() {
        let huge = Duration::seconds(1_000_000_000_000_000);
        assert!(matches!(
            Payload::new("u1", huge),
            Err(PayloadError::ExpiryOutOfRange)
        ));
        assert!(matches!(
            Payload::new("u1", -huge),
            Err(PayloadError::ExpiryOutOfRange)
        ));
    }

    #[test]
    fn ids_are_fresh_per_payload() {
        let a = Payload::new("u1", Duration::minutes(1)).unwrap();
        let b = Payload::new("u1", Duration::minutes(1)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn token_id_round_trips_through_display() {
        let id = TokenId::generate().unwrap();
        assert_eq!(id.to_string().parse::<TokenId>().unwrap(), id);
    }
}
