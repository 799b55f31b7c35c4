use crate::application_port::{TokenError, TokenMaker};
use crate::domain_model::{Payload, TokenId};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rusty_paseto::prelude::*;
use serde::Deserialize;

pub const SYMMETRIC_KEY_SIZE: usize = 32;

const V4_LOCAL_HEADER: &str = "v4.local.";
// nonce (32) + authentication tag (32)
const MIN_V4_LOCAL_BODY: usize = 64;

#[derive(Debug, Deserialize)]
struct Claims {
    jti: String,
    sub: String,
    iat: String,
    exp: String,
}

/// PASETO v4.local tokens: claims are encrypted and authenticated.
///
/// The parser enforces `exp` and `nbf` itself, so expiry never reaches
/// the claim extraction below.
pub struct PasetoMaker {
    key: [u8; SYMMETRIC_KEY_SIZE],
}

impl PasetoMaker {
    pub fn new(key: &[u8]) -> Result<Self, TokenError> {
        let key: [u8; SYMMETRIC_KEY_SIZE] = key.try_into().map_err(|_| {
            TokenError::InvalidKey(format!("must be exactly {} bytes", SYMMETRIC_KEY_SIZE))
        })?;
        Ok(PasetoMaker { key })
    }

    fn symmetric_key(&self) -> PasetoSymmetricKey<V4, Local> {
        PasetoSymmetricKey::<V4, Local>::from(Key::from(&self.key))
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, TokenError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| TokenError::InvalidToken)
}

/// The parser slices the decoded body without a length check, so
/// anything shorter than nonce plus tag must be stopped here.
fn check_envelope(token: &str) -> Result<(), TokenError> {
    let rest = token
        .strip_prefix(V4_LOCAL_HEADER)
        .ok_or(TokenError::InvalidToken)?;
    let body = rest.split('.').next().unwrap_or_default();
    let decoded = URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|_| TokenError::InvalidToken)?;
    if decoded.len() < MIN_V4_LOCAL_BODY {
        return Err(TokenError::InvalidToken);
    }
    Ok(())
}

fn creation<E: std::fmt::Display>(error: E) -> TokenError {
    TokenError::Creation(error.to_string())
}

impl TokenMaker for PasetoMaker {
    fn create_token(
        &self,
        subject: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(subject, duration)?;

        let jti = payload.id.to_string();
        let issued_at = rfc3339(payload.issued_at);
        let expires_at = rfc3339(payload.expires_at);

        let key = self.symmetric_key();
        let token = PasetoBuilder::<V4, Local>::default()
            .set_claim(TokenIdentifierClaim::from(jti.as_str()))
            .set_claim(SubjectClaim::from(payload.subject.as_str()))
            .set_claim(IssuedAtClaim::try_from(issued_at.as_str()).map_err(creation)?)
            .set_claim(NotBeforeClaim::try_from(issued_at.as_str()).map_err(creation)?)
            .set_claim(ExpirationClaim::try_from(expires_at.as_str()).map_err(creation)?)
            .build(&key)
            .map_err(creation)?;

        Ok((token, payload))
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        check_envelope(token)?;

        let key = self.symmetric_key();
        let value = PasetoParser::<V4, Local>::default()
            .parse(token, &key)
            .map_err(|e| match e {
                GenericParserError::ClaimError {
                    source: PasetoClaimError::Expired,
                } => TokenError::TokenExpired,
                _ => TokenError::InvalidToken,
            })?;

        let claims: Claims =
            serde_json::from_value(value).map_err(|_| TokenError::InvalidToken)?;
        let id = claims
            .jti
            .parse::<TokenId>()
            .map_err(|_| TokenError::InvalidToken)?;

        Ok(Payload {
            id,
            subject: claims.sub,
            issued_at: parse_time(&claims.iat)?,
            expires_at: parse_time(&claims.exp)?,
        })
    }
}
