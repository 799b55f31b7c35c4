use crate::application_port::*;
use crate::domain_model::{BORROWER_ROLE, Borrower, BorrowerId, Payload, Session, TokenId};
use crate::domain_port::{BorrowerRepo, CreateSessionInput, NewBorrower, SessionStore, SessionStoreError};
use crate::logger::*;
use chrono::Duration;
use std::sync::Arc;

const MIN_PASSWORD_LEN: usize = 6;
const MAX_NAME_LEN: usize = 20;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

/// Access tokens are stateless. Refresh tokens are only honoured while
/// their session exists and is not blocked.
pub struct RealAuthService {
    borrower_repo: Arc<dyn BorrowerRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_maker: Arc<dyn TokenMaker>,
    session_store: Arc<dyn SessionStore>,
    config: AuthConfig,
}

impl RealAuthService {
    pub fn new(
        borrower_repo: Arc<dyn BorrowerRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_maker: Arc<dyn TokenMaker>,
        session_store: Arc<dyn SessionStore>,
        config: AuthConfig,
    ) -> Self {
        Self {
            borrower_repo,
            credential_hasher,
            token_maker,
            session_store,
            config,
        }
    }

    fn validate_sign_up(input: &SignUpInput) -> Result<(), AuthError> {
        let bad = |msg: &str| Err(AuthError::BadRequest(msg.to_string()));

        match input.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return bad("email is not valid"),
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return bad("password must be at least 6 characters");
        }
        let line_id_len = input.line_id.chars().count();
        if line_id_len == 0 || line_id_len > MAX_NAME_LEN {
            return bad("line_id must be 1 to 20 characters");
        }
        let nickname_len = input.nickname.chars().count();
        if nickname_len == 0
            || nickname_len > MAX_NAME_LEN
            || !input.nickname.chars().all(char::is_alphanumeric)
        {
            return bad("nickname must be 1 to 20 alphanumeric characters");
        }
        Ok(())
    }

    fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, AuthError> {
        let (token, payload) = self.token_maker.create_token(subject, ttl)?;
        Ok(IssuedToken { token, payload })
    }

    /// Looks up the session behind a verified refresh payload.
    async fn live_session(&self, payload: &Payload) -> Result<Session, AuthError> {
        let session = match self.session_store.get_session_by_id(payload.id).await {
            Ok(session) => session,
            Err(SessionStoreError::NotFound) => {
                warn!(session_id = %payload.id, "refresh rejected: session not found");
                return Err(AuthError::Unauthorized("session not found".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if session.is_blocked {
            warn!(session_id = %session.id, "refresh rejected: session is blocked");
            return Err(AuthError::Unauthorized("session is blocked".to_string()));
        }
        if session.subject != payload.subject {
            warn!(session_id = %session.id, "refresh rejected: subject mismatch");
            return Err(AuthError::Unauthorized("mismatched session subject".to_string()));
        }
        Ok(session)
    }
}

/// Resource ownership: the authenticated subject must name the owner verbatim.
pub fn ensure_owner(requester: &Payload, owner: &str) -> Result<(), AuthError> {
    if requester.subject == owner {
        Ok(())
    } else {
        Err(AuthError::Forbidden(
            "resource doesn't belong to the authenticated user".to_string(),
        ))
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn sign_up(&self, input: SignUpInput) -> Result<Borrower, AuthError> {
        Self::validate_sign_up(&input)?;

        let hashed_password = self.credential_hasher.hash_password(&input.password).await?;
        let borrower = self
            .borrower_repo
            .create(NewBorrower {
                email: input.email,
                hashed_password,
                line_id: input.line_id,
                nickname: input.nickname,
                role: BORROWER_ROLE.to_string(),
            })
            .await?;

        info!(borrower_id = %borrower.id, "borrower signed up");
        Ok(borrower)
    }

    async fn sign_in(&self, input: SignInInput) -> Result<SignInOutput, AuthError> {
        let borrower = self
            .borrower_repo
            .get_by_email(&input.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&input.password, &borrower.hashed_password)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let subject = borrower.id.to_string();
        let refresh_token = self.issue(&subject, self.config.refresh_token_ttl)?;

        self.session_store
            .create_session(CreateSessionInput {
                id: refresh_token.payload.id,
                subject: subject.clone(),
                expires_at: refresh_token.payload.expires_at,
            })
            .await?;

        let access_token = self.issue(&subject, self.config.access_token_ttl)?;

        info!(borrower_id = %borrower.id, session_id = %refresh_token.payload.id, "borrower signed in");
        Ok(SignInOutput {
            borrower,
            access_token,
            refresh_token,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError> {
        let payload = self.token_maker.verify_token(refresh_token)?;
        let session = self.live_session(&payload).await?;

        let access_token = self.issue(&session.subject, self.config.access_token_ttl)?;
        info!(session_id = %session.id, "access token refreshed");
        Ok(access_token)
    }

    async fn sign_out(&self, refresh_token: &str) -> Result<(), AuthError> {
        let payload = self.token_maker.verify_token(refresh_token)?;
        match self.session_store.block_session(payload.id).await {
            Ok(session) => {
                info!(session_id = %session.id, "borrower signed out");
                Ok(())
            }
            Err(SessionStoreError::NotFound) => {
                Err(AuthError::Unauthorized("session not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn block_session(&self, id: TokenId) -> Result<Session, AuthError> {
        let session = self.session_store.block_session(id).await?;
        info!(session_id = %session.id, subject = %session.subject, "session blocked");
        Ok(session)
    }

    async fn get_borrower(
        &self,
        requester: &Payload,
        id: BorrowerId,
    ) -> Result<Borrower, AuthError> {
        ensure_owner(requester, &id.to_string())?;

        self.borrower_repo
            .get_by_id(id)
            .await?
            .ok_or(AuthError::BorrowerNotFound)
    }
}
