use async_trait::async_trait;

use crate::domain::{Article, Comment, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// `save` is an upsert: records without an id are inserted and get one
/// assigned, records with an id are updated. Each call is one transaction.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Largest row offset a page window may reach (a signed 64-bit SQL OFFSET).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// A 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Both values are raised to at least 1. `page` is capped so the offset
    /// stays within [`MAX_OFFSET`]; pages past the data come back empty.
    pub fn new(page: u64, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let last_page = MAX_OFFSET / per_page + 1;

        Self {
            page: page.clamp(1, last_page),
            per_page,
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// User repository with domain-specific methods.
///
/// Users returned by lookups carry their articles and comments. `save` only
/// writes the user row; children passed in are handed back untouched.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// List users ordered by id.
    async fn list(&self, page: PageRequest) -> Result<Paginated<User>, RepoError>;
}

/// Article repository.
#[async_trait]
pub trait ArticleRepository: BaseRepository<Article, i64> {
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Article>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Comment>, RepoError>;
}
