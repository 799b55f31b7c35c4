use crate::domain_model::{Session, TokenId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct CreateSessionInput {
    pub id: TokenId,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Upsert a session; the stored record always starts unblocked.
    async fn create_session(&self, input: CreateSessionInput) -> Result<Session, SessionStoreError>;
    /// `NotFound` for ids never created or already expired out of the store.
    async fn get_session_by_id(&self, id: TokenId) -> Result<Session, SessionStoreError>;
    /// Mark a session blocked. Blocking twice is a no-op.
    async fn block_session(&self, id: TokenId) -> Result<Session, SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session not found")]
    NotFound,
    #[error("infra error: {0}")]
    Store(String),
}
