use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{self, Settings};
use anyhow::anyhow;
use chrono::Duration;
use std::sync::Arc;

/// Long-lived services shared by every request.
pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub token_maker: Arc<dyn TokenMaker>,
}

impl Server {
    pub fn new(auth_service: Arc<dyn AuthService>, token_maker: Arc<dyn TokenMaker>) -> Self {
        Self {
            auth_service,
            token_maker,
        }
    }

    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let token_maker = build_token_maker(&settings.token)?;

        let session_store: Arc<dyn SessionStore> = match settings.session.backend.as_str() {
            "memory" => Arc::new(MemorySessionStore::new()),
            "redis" => {
                let redis_client = redis::Client::open(settings.session.redis_url.as_str())?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisSessionStore::new(
                    redis_manager,
                    settings.session.key_prefix.clone(),
                ))
            }
            other => return Err(anyhow!("Unknown session backend: {}", other)),
        };

        let borrower_repo: Arc<dyn BorrowerRepo> = match settings.borrower.backend.as_str() {
            "memory" => Arc::new(MemoryBorrowerRepo::new()),
            other => return Err(anyhow!("Unknown borrower backend: {}", other)),
        };

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            borrower_repo,
            credential_hasher,
            token_maker.clone(),
            session_store,
            AuthConfig {
                access_token_ttl: Duration::seconds(settings.token.access_token_ttl_secs),
                refresh_token_ttl: Duration::seconds(settings.token.refresh_token_ttl_secs),
            },
        ));

        info!(
            algorithm = %settings.token.algorithm,
            session_backend = %settings.session.backend,
            "server started"
        );

        Ok(Self::new(auth_service, token_maker))
    }
}

pub fn build_token_maker(token: &settings::Token) -> anyhow::Result<Arc<dyn TokenMaker>> {
    let key = token.symmetric_key.as_bytes();
    let token_maker: Arc<dyn TokenMaker> = match token.algorithm.as_str() {
        "jwt" => Arc::new(JwtMaker::new(key)?),
        "paseto" => Arc::new(PasetoMaker::new(key)?),
        other => return Err(anyhow!("Unknown token algorithm: {}", other)),
    };
    Ok(token_maker)
}
