use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message) = if let Some(err) = err.find::<ApiRejection>() {
        (err.code, err.message.clone())
    } else if err.is_not_found() {
        (ApiErrorCode::NotFound, "resource not found".to_string())
    } else if let Some(err) = err.find::<BodyDeserializeError>() {
        (
            ApiErrorCode::BadRequest,
            format!("failed to parse request: {}", err),
        )
    } else if err.find::<reject::InvalidHeader>().is_some() {
        (
            ApiErrorCode::BadRequest,
            "request header is not valid text".to_string(),
        )
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            ApiErrorCode::MethodNotAllowed,
            "method not allowed".to_string(),
        )
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (ApiErrorCode::InternalError, "internal error".to_string())
    };

    let json = warp::reply::json(&ApiError { code, message });
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApiErrorCode {
    BadRequest,
    Unauthorized,
    InvalidCredentials,
    InvalidToken,
    TokenExpired,
    Forbidden,
    NotFound,
    Conflict,
    MethodNotAllowed,
    InternalError,
}

impl ApiErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::Unauthorized
            | ApiErrorCode::InvalidCredentials
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A request failure carrying its API code and a human readable message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiRejection {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiRejection {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiRejection {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Unauthorized, message)
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> Self {
        warn!("Internal error: {}", error);
        Self::new(ApiErrorCode::InternalError, "internal error")
    }

    /// Verification failures keep expiry apart from everything else.
    pub fn from_token_error(context: &str, error: TokenError) -> Self {
        let code = match error {
            TokenError::TokenExpired => ApiErrorCode::TokenExpired,
            TokenError::InvalidToken => ApiErrorCode::InvalidToken,
            TokenError::InvalidKey(_) | TokenError::Creation(_) => return Self::internal(error),
        };
        Self::new(code, format!("{}: {}", context, error))
    }
}

impl reject::Reject for ApiRejection {}

impl From<AuthError> for ApiRejection {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => {
                Self::new(ApiErrorCode::InvalidCredentials, "invalid email or password")
            }
            AuthError::BadRequest(msg) => Self::new(ApiErrorCode::BadRequest, msg),
            AuthError::BorrowerExists => Self::new(ApiErrorCode::Conflict, error.to_string()),
            AuthError::BorrowerNotFound | AuthError::SessionNotFound => {
                Self::new(ApiErrorCode::NotFound, error.to_string())
            }
            AuthError::Token(e) => Self::from_token_error("failed to verify token", e),
            AuthError::Unauthorized(msg) => Self::unauthorized(msg),
            AuthError::Forbidden(msg) => Self::new(ApiErrorCode::Forbidden, msg),
            AuthError::Store(_) | AuthError::InternalError(_) => Self::internal(error),
        }
    }
}
