use crate::domain_model::{Session, TokenId};
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::collections::HashMap;

const BLOCK_SESSION: &str = include_str!("block_session.lua");

/// One hash per session under `<prefix>:<id>`, expiring with the refresh token.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisSessionStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, id: &TokenId) -> String {
        format!("{}:{}", self.prefix, id)
    }

    async fn read(&self, key: &str) -> Result<Session, SessionStoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(key).await.map_err(store_err)?;
        if fields.is_empty() {
            return Err(SessionStoreError::NotFound);
        }
        session_from_fields(&fields)
    }
}

fn store_err(e: redis::RedisError) -> SessionStoreError {
    SessionStoreError::Store(e.to_string())
}

fn corrupt(field: &str) -> SessionStoreError {
    SessionStoreError::Store(format!("corrupt session record: bad `{}`", field))
}

fn field<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str, SessionStoreError> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| corrupt(name))
}

fn session_from_fields(fields: &HashMap<String, String>) -> Result<Session, SessionStoreError> {
    let id = field(fields, "id")?
        .parse::<TokenId>()
        .map_err(|_| corrupt("id"))?;
    let subject = field(fields, "subject")?.to_string();
    let is_blocked = field(fields, "is_blocked")?
        .parse::<bool>()
        .map_err(|_| corrupt("is_blocked"))?;
    let expires_at = DateTime::parse_from_rfc3339(field(fields, "expires_at")?)
        .map_err(|_| corrupt("expires_at"))?
        .with_timezone(&Utc);

    Ok(Session {
        id,
        subject,
        is_blocked,
        expires_at,
    })
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn create_session(&self, input: CreateSessionInput) -> Result<Session, SessionStoreError> {
        let session = Session::new(input.id, input.subject, input.expires_at);
        let key = self.key(&session.id);
        let fields = [
            ("id", session.id.to_string()),
            ("subject", session.subject.clone()),
            ("is_blocked", session.is_blocked.to_string()),
            ("expires_at", session.expires_at.to_rfc3339()),
        ];

        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &fields)
            .ignore()
            .expire_at(&key, session.expires_at.timestamp())
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;

        Ok(session)
    }

    async fn get_session_by_id(&self, id: TokenId) -> Result<Session, SessionStoreError> {
        self.read(&self.key(&id)).await
    }

    async fn block_session(&self, id: TokenId) -> Result<Session, SessionStoreError> {
        let key = self.key(&id);
        let mut conn = self.conn.clone();
        let blocked: i64 = Script::new(BLOCK_SESSION)
            .key(&key)
            .invoke_async(&mut conn)
            .await
            .map_err(store_err)?;

        if blocked == 0 {
            return Err(SessionStoreError::NotFound);
        }
        self.read(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_a_stored_hash() {
        let id = TokenId::generate().unwrap();
        let id_str = id.to_string();
        let session = session_from_fields(&fields(&[
            ("id", id_str.as_str()),
            ("subject", "u1"),
            ("is_blocked", "true"),
            ("expires_at", "2030-01-01T00:00:00+00:00"),
        ]))
        .unwrap();

        assert_eq!(session.id, id);
        assert_eq!(session.subject, "u1");
        assert!(session.is_blocked);
    }

    #[test]
    fn partial_hash_is_a_store_error() {
        let result = session_from_fields(&fields(&[("is_blocked", "true")]));
        assert!(matches!(result, Err(SessionStoreError::Store(_))));
    }
}
