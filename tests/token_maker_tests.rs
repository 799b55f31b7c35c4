use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use lendgate::application_impl::{JwtMaker, PasetoMaker};
use lendgate::application_port::{TokenError, TokenMaker};
use lendgate::domain_model::Payload;
use std::sync::Arc;

const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";
const OTHER_KEY: &[u8] = b"fedcba9876543210fedcba9876543210";

fn assert_close(expected: DateTime<Utc>, actual: DateTime<Utc>) {
    let drift = (actual - expected).num_milliseconds().abs();
    assert!(drift <= 1000, "expected {} ~ {}, drift {}ms", expected, actual, drift);
}

/// Every maker runs the same suite.
macro_rules! token_maker_contract {
    ($name:ident, $make:expr) => {
        mod $name {
            use super::*;

            fn maker(key: &[u8]) -> Arc<dyn TokenMaker> {
                Arc::new($make(key).unwrap())
            }

            #[test]
            fn valid_token_round_trips() {
                let maker = maker(KEY);
                let duration = Duration::minutes(1);
                let issued_at = Utc::now();

                let (token, created) = maker.create_token("borrower@example.com", duration).unwrap();
                assert!(!token.is_empty());

                let payload = maker.verify_token(&token).unwrap();
                assert_eq!(payload.id, created.id);
                assert_eq!(payload.subject, "borrower@example.com");
                assert_close(issued_at, payload.issued_at);
                assert_close(issued_at + duration, payload.expires_at);
            }

            #[test]
            fn negative_duration_mints_but_verifies_as_expired() {
                let maker = maker(KEY);
                let (token, payload) = maker.create_token("u1", Duration::minutes(-1)).unwrap();
                assert!(!token.is_empty());
                assert!(payload.expires_at < payload.issued_at);

                assert_eq!(maker.verify_token(&token), Err(TokenError::TokenExpired));
            }

            #[test]
            fn token_from_another_key_is_invalid() {
                let (token, _) = maker(OTHER_KEY).create_token("u1", Duration::minutes(1)).unwrap();
                assert_eq!(maker(KEY).verify_token(&token), Err(TokenError::InvalidToken));
            }

            #[test]
            fn expired_token_from_another_key_is_invalid() {
                let (token, _) = maker(OTHER_KEY).create_token("u1", Duration::minutes(-1)).unwrap();
                assert_eq!(maker(KEY).verify_token(&token), Err(TokenError::InvalidToken));
            }

            #[test]
            fn malformed_tokens_are_invalid() {
                let maker = maker(KEY);
                for token in ["", "abc", "a.b.c", "v4.local.", "Bearer x"] {
                    assert_eq!(maker.verify_token(token), Err(TokenError::InvalidToken), "{}", token);
                }
            }

            #[test]
            fn overflowing_duration_is_a_creation_error() {
                let maker = maker(KEY);
                let huge = Duration::seconds(1_000_000_000_000_000);
                for duration in [huge, -huge] {
                    assert!(matches!(
                        maker.create_token("u1", duration),
                        Err(TokenError::Creation(_))
                    ));
                }
            }

            #[test]
            fn ids_never_repeat() {
                let maker = maker(KEY);
                let (_, a) = maker.create_token("u1", Duration::minutes(1)).unwrap();
                let (_, b) = maker.create_token("u1", Duration::minutes(1)).unwrap();
                assert_ne!(a.id, b.id);
            }

            #[test]
            fn shared_maker_verifies_across_threads() {
                let maker = maker(KEY);
                let handles: Vec<_> = (0..8)
                    .map(|i| {
                        let maker = maker.clone();
                        std::thread::spawn(move || {
                            let subject = format!("u{}", i);
                            let (token, _) = maker.create_token(&subject, Duration::minutes(1)).unwrap();
                            let payload: Payload = maker.verify_token(&token).unwrap();
                            assert_eq!(payload.subject, subject);
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            }
        }
    };
}

token_maker_contract!(jwt, JwtMaker::new);
token_maker_contract!(paseto, PasetoMaker::new);

fn forge_unsigned_jwt(alg: &str) -> String {
    let payload = Payload::new("u1", Duration::minutes(1)).unwrap();
    let header = serde_json::json!({ "alg": alg, "typ": "JWT" });
    let claims = serde_json::json!({
        "jti": payload.id.to_string(),
        "sub": payload.subject,
        "iat": payload.issued_at.timestamp(),
        "nbf": payload.issued_at.timestamp(),
        "exp": payload.expires_at.timestamp(),
    });
    format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

#[test]
fn paseto_envelope_too_short_for_nonce_and_tag_is_invalid() {
    let maker = PasetoMaker::new(KEY).unwrap();
    for len in [0usize, 3, 32, 63] {
        let token = format!("v4.local.{}", URL_SAFE_NO_PAD.encode(vec![0u8; len]));
        assert_eq!(maker.verify_token(&token), Err(TokenError::InvalidToken), "{}", len);
    }
    assert_eq!(maker.verify_token("v4.local.AAAA"), Err(TokenError::InvalidToken));
}

#[test]
fn unsigned_jwt_is_rejected() {
    let maker = JwtMaker::new(KEY).unwrap();
    for alg in ["none", "None", "NONE"] {
        assert_eq!(
            maker.verify_token(&forge_unsigned_jwt(alg)),
            Err(TokenError::InvalidToken)
        );
    }
}

#[test]
fn other_hmac_variant_is_rejected() {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    let payload = Payload::new("u1", Duration::minutes(1)).unwrap();
    let claims = serde_json::json!({
        "jti": payload.id.to_string(),
        "sub": payload.subject,
        "iat": payload.issued_at.timestamp(),
        "nbf": payload.issued_at.timestamp(),
        "exp": payload.expires_at.timestamp(),
    });
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(KEY),
    )
    .unwrap();

    let maker = JwtMaker::new(KEY).unwrap();
    assert_eq!(maker.verify_token(&token), Err(TokenError::InvalidToken));
}

#[test]
fn jwt_without_id_is_invalid() {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    let now = Utc::now().timestamp();
    let claims = serde_json::json!({ "sub": "u1", "iat": now, "nbf": now, "exp": now + 60 });
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(KEY),
    )
    .unwrap();

    let maker = JwtMaker::new(KEY).unwrap();
    assert_eq!(maker.verify_token(&token), Err(TokenError::InvalidToken));
}
