use crate::application_port::{TokenError, TokenMaker};
use crate::domain_model::{Payload, TokenId};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const MIN_SECRET_KEY_SIZE: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    jti: String,
    sub: String,
    iat: i64,
    nbf: i64,
    exp: i64,
}

/// HS256 signed tokens. Claims are readable by anyone, tampering is not.
pub struct JwtMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtMaker {
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_KEY_SIZE {
            return Err(TokenError::InvalidKey(format!(
                "must be at least {} bytes",
                MIN_SECRET_KEY_SIZE
            )));
        }

        // Only HS256 is accepted; anything else in the header (including "none") fails.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        Ok(JwtMaker {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(secs, 0).ok_or(TokenError::InvalidToken)
}

impl TokenMaker for JwtMaker {
    fn create_token(
        &self,
        subject: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(subject, duration)?;
        let claims = Claims {
            jti: payload.id.to_string(),
            sub: payload.subject.clone(),
            iat: payload.issued_at.timestamp(),
            nbf: payload.issued_at.timestamp(),
            exp: payload.expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Creation(e.to_string()))?;
        Ok((token, payload))
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                _ => TokenError::InvalidToken,
            }
        })?;
        let claims = data.claims;
        let id = claims
            .jti
            .parse::<TokenId>()
            .map_err(|_| TokenError::InvalidToken)?;

        Ok(Payload {
            id,
            subject: claims.sub,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
        })
    }
}
