use crate::domain_model::{Borrower, BorrowerId};

#[derive(Debug, Clone)]
pub struct NewBorrower {
    pub email: String,
    pub hashed_password: String,
    pub line_id: String,
    pub nickname: String,
    pub role: String,
}

#[async_trait::async_trait]
pub trait BorrowerRepo: Send + Sync {
    async fn create(&self, input: NewBorrower) -> Result<Borrower, RepoError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<Borrower>, RepoError>;
    async fn get_by_id(&self, id: BorrowerId) -> Result<Option<Borrower>, RepoError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already registered")]
    Duplicate,
    #[error("infra error: {0}")]
    Store(String),
}
