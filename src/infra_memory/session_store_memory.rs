use crate::domain_model::{Session, TokenId};
use crate::domain_port::*;
use chrono::Utc;
use dashmap::DashMap;

/// Sessions held in a concurrent map. Expired rows read as missing and
/// are evicted lazily.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<TokenId, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-checks under the shard lock so a concurrent upsert survives.
    fn evict_expired(&self, id: &TokenId) {
        self.sessions
            .remove_if(id, |_, session| session.is_expired_at(Utc::now()));
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_session(&self, input: CreateSessionInput) -> Result<Session, SessionStoreError> {
        let session = Session::new(input.id, input.subject, input.expires_at);
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session_by_id(&self, id: TokenId) -> Result<Session, SessionStoreError> {
        let session = self
            .sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(SessionStoreError::NotFound)?;

        if session.is_expired_at(Utc::now()) {
            self.evict_expired(&id);
            return Err(SessionStoreError::NotFound);
        }
        Ok(session)
    }

    async fn block_session(&self, id: TokenId) -> Result<Session, SessionStoreError> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionStoreError::NotFound)?;

        if entry.is_expired_at(Utc::now()) {
            drop(entry);
            self.evict_expired(&id);
            return Err(SessionStoreError::NotFound);
        }
        entry.is_blocked = true;
        Ok(entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn input(subject: &str, ttl: Duration) -> CreateSessionInput {
        CreateSessionInput {
            id: TokenId::generate().unwrap(),
            subject: subject.to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = MemorySessionStore::new();
        let created = store.create_session(input("u1", Duration::hours(1))).await.unwrap();
        assert!(!created.is_blocked);

        let fetched = store.get_session_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemorySessionStore::new();
        let result = store.get_session_by_id(TokenId::generate().unwrap()).await;
        assert!(matches!(result, Err(SessionStoreError::NotFound)));
    }

    #[tokio::test]
    async fn expired_session_reads_as_not_found() {
        let store = MemorySessionStore::new();
        let created = store.create_session(input("u1", Duration::seconds(-1))).await.unwrap();

        let result = store.get_session_by_id(created.id).await;
        assert!(matches!(result, Err(SessionStoreError::NotFound)));
        let result = store.block_session(created.id).await;
        assert!(matches!(result, Err(SessionStoreError::NotFound)));
    }

    #[tokio::test]
    async fn eviction_spares_a_live_replacement() {
        let store = MemorySessionStore::new();
        let expired = store.create_session(input("u1", Duration::seconds(-1))).await.unwrap();
        store
            .create_session(CreateSessionInput {
                id: expired.id,
                subject: "u1".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            })
            .await
            .unwrap();

        store.evict_expired(&expired.id);
        assert!(store.get_session_by_id(expired.id).await.is_ok());

        store
            .create_session(CreateSessionInput {
                id: expired.id,
                subject: "u1".to_string(),
                expires_at: Utc::now() - Duration::seconds(1),
            })
            .await
            .unwrap();
        store.evict_expired(&expired.id);
        assert!(store.sessions.get(&expired.id).is_none());
    }

    #[tokio::test]
    async fn block_is_sticky_and_idempotent() {
        let store = MemorySessionStore::new();
        let created = store.create_session(input("u1", Duration::hours(1))).await.unwrap();

        assert!(store.block_session(created.id).await.unwrap().is_blocked);
        assert!(store.block_session(created.id).await.unwrap().is_blocked);
        assert!(store.get_session_by_id(created.id).await.unwrap().is_blocked);
    }

    #[tokio::test]
    async fn recreate_resets_block_flag() {
        let store = MemorySessionStore::new();
        let first = input("u1", Duration::hours(1));
        let created = store.create_session(first.clone()).await.unwrap();
        store.block_session(created.id).await.unwrap();

        let again = store.create_session(first).await.unwrap();
        assert!(!again.is_blocked);
    }

    #[tokio::test]
    async fn concurrent_creates_for_distinct_ids() {
        let store = Arc::new(MemorySessionStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_session(input(&format!("u{}", i), Duration::hours(1)))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            let session = handle.await.unwrap();
            let fetched = store.get_session_by_id(session.id).await.unwrap();
            assert_eq!(fetched.subject, session.subject);
        }
    }
}
