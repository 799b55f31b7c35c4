use crate::domain_model::{Borrower, BorrowerId};
use crate::domain_port::*;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Default)]
pub struct MemoryBorrowerRepo {
    borrowers: DashMap<BorrowerId, Borrower>,
    emails: DashMap<String, BorrowerId>,
}

impl MemoryBorrowerRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BorrowerRepo for MemoryBorrowerRepo {
    async fn create(&self, input: NewBorrower) -> Result<Borrower, RepoError> {
        // The email slot stays locked until the borrower row is in place.
        match self.emails.entry(input.email.clone()) {
            Entry::Occupied(_) => Err(RepoError::Duplicate),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let borrower = Borrower {
                    id: BorrowerId(uuid::Uuid::new_v4()),
                    email: input.email,
                    hashed_password: input.hashed_password,
                    line_id: input.line_id,
                    nickname: input.nickname,
                    role: input.role,
                    is_email_verified: false,
                    created_at: now,
                    updated_at: now,
                };
                self.borrowers.insert(borrower.id, borrower.clone());
                slot.insert(borrower.id);
                Ok(borrower)
            }
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Borrower>, RepoError> {
        let id = match self.emails.get(email) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: BorrowerId) -> Result<Option<Borrower>, RepoError> {
        Ok(self.borrowers.get(&id).map(|entry| entry.value().clone()))
    }
}
