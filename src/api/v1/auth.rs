use super::error::*;
use crate::application_port::TokenMaker;
use crate::domain_model::Payload;
use std::sync::Arc;
use warp::http::HeaderMap;
use warp::{Filter, reject};

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const AUTHORIZATION_TYPE_BEARER: &str = "bearer";

/// Bearer gate for protected routes. Extracts the verified [`Payload`].
pub fn with_auth(
    token_maker: Arc<dyn TokenMaker>,
) -> impl Filter<Extract = (Payload,), Error = warp::Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: HeaderMap| {
        let token_maker = token_maker.clone();
        async move {
            authorization_value(&headers)
                .and_then(|header| authorize(token_maker.as_ref(), header))
                .map_err(reject::custom)
        }
    })
}

/// A value that is not visible ASCII can never be a bearer credential.
fn authorization_value(headers: &HeaderMap) -> Result<Option<&str>, ApiRejection> {
    match headers.get(AUTHORIZATION_HEADER) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| ApiRejection::unauthorized("invalid authorization header format")),
    }
}

pub fn authorize(
    token_maker: &dyn TokenMaker,
    header: Option<&str>,
) -> Result<Payload, ApiRejection> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => {
            return Err(ApiRejection::unauthorized(
                "authorization header is not provided",
            ));
        }
    };

    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(ApiRejection::unauthorized(
            "invalid authorization header format",
        ));
    }

    let authorization_type = fields[0].to_lowercase();
    if authorization_type != AUTHORIZATION_TYPE_BEARER {
        return Err(ApiRejection::unauthorized(format!(
            "unsupported authorization type {}",
            authorization_type
        )));
    }

    token_maker
        .verify_token(fields[1])
        .map_err(|e| ApiRejection::from_token_error("failed to verify access token", e))
}
