//! Data persister port - the write gateway between records and the store.

use async_trait::async_trait;

use crate::domain::Resource;
use crate::error::DomainError;

/// A persister handles create/update/delete for the resource kinds it
/// supports. Several persisters can sit behind one dispatcher.
#[async_trait]
pub trait DataPersister: Send + Sync {
    /// Whether this persister handles `resource`.
    fn supports(&self, resource: &Resource) -> bool;

    /// Create or update the record and return the stored version.
    async fn persist(&self, resource: Resource) -> Result<Resource, DomainError>;

    /// Remove the record permanently.
    async fn remove(&self, resource: Resource) -> Result<(), DomainError>;
}
