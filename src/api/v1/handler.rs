use super::cookie::{clear_refresh_cookie, refresh_cookie};
use super::error::*;
use crate::application_port::*;
use crate::domain_model::{Borrower, BorrowerId, Payload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::http::header::SET_COOKIE;
use warp::reject;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub line_id: String,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub id: BorrowerId,
    pub email: String,
    pub line_id: String,
    pub nickname: String,
    pub role: String,
}

pub async fn sign_up(
    body: SignUpRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = SignUpInput {
        email: body.email,
        password: body.password,
        line_id: body.line_id,
        nickname: body.nickname,
    };
    let borrower = auth_service
        .sign_up(input)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    let response = SignUpResponse {
        id: borrower.id,
        email: borrower.email,
        line_id: borrower.line_id,
        nickname: borrower.nickname,
        role: borrower.role,
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::CREATED,
    ))
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

pub async fn sign_in(
    body: SignInRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = SignInInput {
        email: body.email,
        password: body.password,
    };
    let output = auth_service
        .sign_in(input)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    let cookie = refresh_cookie(
        &output.refresh_token.token,
        output.refresh_token.payload.expires_at,
    )
    .map_err(ApiRejection::internal)
    .map_err(reject::custom)?;
    let response = SignInResponse {
        refresh_token: output.refresh_token.token,
        refresh_token_expires_at: output.refresh_token.payload.expires_at,
        access_token: output.access_token.token,
        access_token_expires_at: output.access_token.payload.expires_at,
    };
    Ok(warp::reply::with_header(
        warp::reply::json(&response),
        SET_COOKIE,
        cookie.to_string(),
    ))
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

fn required_cookie(cookie: Option<String>) -> Result<String, warp::Rejection> {
    cookie
        .filter(|c| !c.is_empty())
        .ok_or_else(|| reject::custom(ApiRejection::unauthorized("refresh token cookie is not provided")))
}

pub async fn refresh_token(
    cookie: Option<String>,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let refresh_token = required_cookie(cookie)?;
    let access_token = auth_service
        .refresh(&refresh_token)
        .await
        .map_err(|e| match e {
            AuthError::Token(e) => {
                ApiRejection::from_token_error("failed to verify refresh token", e)
            }
            e => ApiRejection::from(e),
        })
        .map_err(reject::custom)?;

    let response = RefreshTokenResponse {
        access_token: access_token.token,
        access_token_expires_at: access_token.payload.expires_at,
    };
    Ok(warp::reply::json(&response))
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {}

pub async fn sign_out(
    cookie: Option<String>,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let refresh_token = required_cookie(cookie)?;
    auth_service
        .sign_out(&refresh_token)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_header(
        warp::reply::json(&SignOutResponse {}),
        SET_COOKIE,
        clear_refresh_cookie().to_string(),
    ))
}

#[derive(Debug, Serialize)]
pub struct GetBorrowerResponse {
    pub id: BorrowerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub line_id: String,
    pub nickname: String,
    pub is_email_verified: bool,
    pub role: String,
}

impl From<Borrower> for GetBorrowerResponse {
    fn from(borrower: Borrower) -> Self {
        GetBorrowerResponse {
            id: borrower.id,
            created_at: borrower.created_at,
            updated_at: borrower.updated_at,
            email: borrower.email,
            line_id: borrower.line_id,
            nickname: borrower.nickname,
            is_email_verified: borrower.is_email_verified,
            role: borrower.role,
        }
    }
}

pub async fn get_borrower(
    id: BorrowerId,
    payload: Payload,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let borrower = auth_service
        .get_borrower(&payload, id)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&GetBorrowerResponse::from(borrower)))
}
