//! Dispatcher routing records to the persister that supports them.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Resource;
use crate::error::DomainError;
use crate::ports::DataPersister;

/// Ordered list of persisters; the first one supporting a record wins.
#[derive(Clone, Default)]
pub struct PersisterChain {
    persisters: Vec<Arc<dyn DataPersister>>,
}

impl PersisterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, persister: Arc<dyn DataPersister>) -> Self {
        self.persisters.push(persister);
        self
    }

    fn resolve(&self, resource: &Resource) -> Result<&Arc<dyn DataPersister>, DomainError> {
        self.persisters
            .iter()
            .find(|p| p.supports(resource))
            .ok_or(DomainError::Unsupported(resource.kind()))
    }
}

#[async_trait]
impl DataPersister for PersisterChain {
    fn supports(&self, resource: &Resource) -> bool {
        self.persisters.iter().any(|p| p.supports(resource))
    }

    async fn persist(&self, resource: Resource) -> Result<Resource, DomainError> {
        self.resolve(&resource)?.persist(resource).await
    }

    async fn remove(&self, resource: Resource) -> Result<(), DomainError> {
        self.resolve(&resource)?.remove(resource).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Article, User};

    /// Accepts articles only and echoes them back.
    struct ArticleEcho;

    #[async_trait]
    impl DataPersister for ArticleEcho {
        fn supports(&self, resource: &Resource) -> bool {
            matches!(resource, Resource::Article(_))
        }

        async fn persist(&self, resource: Resource) -> Result<Resource, DomainError> {
            Ok(resource)
        }

        async fn remove(&self, _resource: Resource) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatches_to_supporting_persister() {
        let chain = PersisterChain::new().with(Arc::new(ArticleEcho));
        let article = Resource::Article(Article::new("Hello", "World"));

        assert!(chain.supports(&article));
        let stored = chain.persist(article).await.unwrap();
        assert_eq!(stored.kind(), "article");
    }

    #[tokio::test]
    async fn test_unsupported_kind_is_rejected() {
        let chain = PersisterChain::new().with(Arc::new(ArticleEcho));
        let user = Resource::User(User::new());

        assert!(!chain.supports(&user));
        let err = chain.remove(user).await.unwrap_err();
        assert!(matches!(err, DomainError::Unsupported("user")));
    }
}
