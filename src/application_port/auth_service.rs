use super::TokenError;
use crate::domain_model::{Borrower, BorrowerId, Payload, Session, TokenId};
use crate::domain_port::{RepoError, SessionStoreError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("borrower already exists")]
    BorrowerExists,
    #[error("borrower not found")]
    BorrowerNotFound,
    #[error("session not found")]
    SessionNotFound,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<SessionStoreError> for AuthError {
    fn from(error: SessionStoreError) -> Self {
        match error {
            SessionStoreError::NotFound => AuthError::SessionNotFound,
            SessionStoreError::Store(e) => AuthError::Store(e),
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::Duplicate => AuthError::BorrowerExists,
            RepoError::Store(e) => AuthError::Store(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub line_id: String,
    pub nickname: String,
}

#[derive(Debug, Clone)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// A minted token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub payload: Payload,
}

#[derive(Debug, Clone)]
pub struct SignInOutput {
    pub borrower: Borrower,
    pub access_token: IssuedToken,
    pub refresh_token: IssuedToken,
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, input: SignUpInput) -> Result<Borrower, AuthError>;
    /// Issues a session-backed refresh token and a first access token.
    async fn sign_in(&self, input: SignInInput) -> Result<SignInOutput, AuthError>;
    /// Exchanges a refresh token for a new access token. The refresh token is not rotated.
    async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError>;
    /// Blocks the session behind `refresh_token`.
    async fn sign_out(&self, refresh_token: &str) -> Result<(), AuthError>;
    /// Administrative revocation of a refresh session.
    async fn block_session(&self, id: TokenId) -> Result<Session, AuthError>;
    async fn get_borrower(&self, requester: &Payload, id: BorrowerId)
    -> Result<Borrower, AuthError>;
}
