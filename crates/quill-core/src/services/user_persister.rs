//! Persistence gateway for user records.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Resource, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{DataPersister, PasswordService, UserRepository};

use super::CredentialNormalizer;

/// Saves and deletes users, hashing any plaintext password on the way in.
pub struct UserDataPersister {
    users: Arc<dyn UserRepository>,
    credentials: CredentialNormalizer,
}

impl UserDataPersister {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self {
            users,
            credentials: CredentialNormalizer::new(passwords),
        }
    }

    /// Normalize credentials, then upsert in one store transaction.
    pub async fn save(&self, mut user: User) -> Result<User, DomainError> {
        if self.credentials.normalize(&mut user)? {
            tracing::debug!(user_id = ?user.id, "Password hash refreshed");
        }

        let id = user.id;
        let mut saved = self.users.save(user).await.map_err(|e| match (e, id) {
            (RepoError::NotFound, Some(id)) => DomainError::NotFound {
                entity_type: "user",
                id,
            },
            (e, _) => e.into(),
        })?;
        saved.rebind_children();

        tracing::info!(user_id = ?saved.id, created = id.is_none(), "User saved");
        Ok(saved)
    }

    /// Delete the record permanently.
    pub async fn delete(&self, user: &User) -> Result<(), DomainError> {
        let id = user
            .id
            .ok_or_else(|| DomainError::invalid("id", "Cannot delete a user that was never saved"))?;

        self.users.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "user",
                id,
            },
            e => e.into(),
        })?;

        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}

#[async_trait]
impl DataPersister for UserDataPersister {
    fn supports(&self, resource: &Resource) -> bool {
        matches!(resource, Resource::User(_))
    }

    async fn persist(&self, resource: Resource) -> Result<Resource, DomainError> {
        match resource {
            Resource::User(user) => self.save(user).await.map(Resource::User),
            other => Err(DomainError::Unsupported(other.kind())),
        }
    }

    async fn remove(&self, resource: Resource) -> Result<(), DomainError> {
        match resource {
            Resource::User(user) => self.delete(&user).await,
            other => Err(DomainError::Unsupported(other.kind())),
        }
    }
}
