//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{DataPersister, PasswordService, TokenService, UserRepository};
use quill_core::services::{PersisterChain, UserDataPersister};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use quill_infra::database::{PostgresUserRepository, connect};

use crate::config::{AppConfig, PaginationConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub persisters: Arc<dyn DataPersister>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let users = user_repository(config).await;

        tracing::info!("Application state initialized");

        Self::from_parts(users, tokens, passwords, config.pagination)
    }

    /// Wire the persister chain around an already-built user repository.
    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        pagination: PaginationConfig,
    ) -> Self {
        let persisters = PersisterChain::new().with(Arc::new(UserDataPersister::new(
            users.clone(),
            passwords.clone(),
        )));

        Self {
            users,
            persisters: Arc::new(persisters),
            tokens,
            passwords,
            pagination,
        }
    }
}

#[cfg(feature = "postgres")]
async fn user_repository(config: &AppConfig) -> Arc<dyn UserRepository> {
    let Some(db_config) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Arc::new(InMemoryStore::new().users());
    };

    match connect(db_config).await {
        Ok(db) => Arc::new(PostgresUserRepository::new(db)),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            Arc::new(InMemoryStore::new().users())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn user_repository(_config: &AppConfig) -> Arc<dyn UserRepository> {
    tracing::info!("Running without postgres feature - using in-memory repository");
    Arc::new(InMemoryStore::new().users())
}
