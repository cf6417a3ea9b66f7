//! In-memory store - used when no database is configured, and in tests.
//!
//! All tables sit behind one async `RwLock`, so each write is atomic and a
//! rejected write leaves prior state untouched. Constraints mirror the SQL
//! schema: unique user email, `RESTRICT` from articles/comments to users,
//! `CASCADE` from comments to articles.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quill_core::domain::{Article, Comment, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    ArticleRepository, BaseRepository, CommentRepository, PageRequest, Paginated, UserRepository,
};

use super::mask_email;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    articles: BTreeMap<i64, Article>,
    comments: BTreeMap<i64, Comment>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email.as_deref() == Some(email) && u.id != except)
    }

    fn check_owner(&self, owner_id: Option<i64>) -> Result<(), RepoError> {
        match owner_id {
            Some(id) if !self.users.contains_key(&id) => Err(RepoError::ForeignKeyViolation(
                format!("owner {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }

    /// Stored row plus the children that point at it.
    fn hydrate(&self, row: &User) -> User {
        let mut user = row.clone();
        user.articles = self
            .articles
            .values()
            .filter(|a| a.owner_id.is_some() && a.owner_id == row.id)
            .cloned()
            .collect();
        user.comments = self
            .comments
            .values()
            .filter(|c| c.owner_id.is_some() && c.owner_id == row.id)
            .cloned()
            .collect();
        user
    }
}

/// Shared in-memory tables, handing out one repository per entity.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn articles(&self) -> InMemoryArticleRepository {
        InMemoryArticleRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository {
            tables: self.tables.clone(),
        }
    }
}

/// User table view of an [`InMemoryStore`].
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|row| tables.hydrate(row)))
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        let mut row = user.clone();
        row.erase_credentials();
        row.articles.clear();
        row.comments.clear();

        match user.id {
            None => {
                let email = row
                    .email
                    .as_deref()
                    .ok_or_else(|| RepoError::Query("email must not be null".to_string()))?;
                if row.password_hash.is_none() {
                    return Err(RepoError::Query("password_hash must not be null".to_string()));
                }
                if tables.email_taken(email, None) {
                    return Err(RepoError::UniqueViolation(format!(
                        "email {} already exists",
                        mask_email(email)
                    )));
                }
                row.id = Some(tables.allocate_id());
                row.created_at = Some(now);
            }
            Some(id) => {
                let existing = tables.users.get(&id).ok_or(RepoError::NotFound)?;
                if let Some(email) = row.email.as_deref() {
                    if tables.email_taken(email, Some(id)) {
                        return Err(RepoError::UniqueViolation(format!(
                            "email {} already exists",
                            mask_email(email)
                        )));
                    }
                }
                // Unknown columns keep their stored value.
                row.email = row.email.or_else(|| existing.email.clone());
                row.password_hash = row.password_hash.or_else(|| existing.password_hash.clone());
                row.created_at = existing.created_at;
            }
        }
        row.updated_at = Some(now);

        let mut stored = row.clone();
        stored.articles = user.articles;
        stored.comments = user.comments;

        if let Some(id) = row.id {
            tables.users.insert(id, row);
        }
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        let owned_articles = tables.articles.values().filter(|a| a.owner_id == Some(id)).count();
        let owned_comments = tables.comments.values().filter(|c| c.owner_id == Some(id)).count();
        if owned_articles + owned_comments > 0 {
            return Err(RepoError::ForeignKeyViolation(format!(
                "user {id} still owns {owned_articles} article(s) and {owned_comments} comment(s)"
            )));
        }

        tables.users.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .map(|row| tables.hydrate(row)))
    }

    async fn list(&self, page: PageRequest) -> Result<Paginated<User>, RepoError> {
        let tables = self.tables.read().await;

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.per_page).unwrap_or(usize::MAX);
        let items = tables
            .users
            .values()
            .skip(offset)
            .take(limit)
            .map(|row| tables.hydrate(row))
            .collect();

        Ok(Paginated {
            items,
            total: tables.users.len() as u64,
            page: page.page,
            per_page: page.per_page,
        })
    }
}

/// Article table view of an [`InMemoryStore`].
pub struct InMemoryArticleRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Article, i64> for InMemoryArticleRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Article>, RepoError> {
        Ok(self.tables.read().await.articles.get(&id).cloned())
    }

    async fn save(&self, mut article: Article) -> Result<Article, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_owner(article.owner_id)?;

        let id = match article.id {
            Some(id) if tables.articles.contains_key(&id) => id,
            Some(_) => return Err(RepoError::NotFound),
            None => tables.allocate_id(),
        };
        article.id = Some(id);
        article.updated_at = Utc::now();

        tables.articles.insert(id, article.clone());
        Ok(article)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        if tables.articles.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.comments.retain(|_, c| c.article_id != id);
        Ok(())
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Article>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .values()
            .filter(|a| a.owner_id == Some(owner_id))
            .cloned()
            .collect())
    }
}

/// Comment table view of an [`InMemoryStore`].
pub struct InMemoryCommentRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Comment, i64> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, mut comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_owner(comment.owner_id)?;
        if !tables.articles.contains_key(&comment.article_id) {
            return Err(RepoError::ForeignKeyViolation(format!(
                "article {} does not exist",
                comment.article_id
            )));
        }

        let id = match comment.id {
            Some(id) if tables.comments.contains_key(&id) => id,
            Some(_) => return Err(RepoError::NotFound),
            None => tables.allocate_id(),
        };
        comment.id = Some(id);
        comment.updated_at = Utc::now();

        tables.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.owner_id == Some(owner_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> User {
        User {
            email: Some(email.to_string()),
            password_hash: Some("$argon2id$stub".to_string()),
            ..User::new()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = InMemoryStore::new();
        let users = store.users();

        let saved = users.save(new_user("a@example.com")).await.unwrap();
        assert_eq!(saved.id, Some(1));
        assert!(saved.created_at.is_some());

        let found = users.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let users = store.users();
        users.save(new_user("a@example.com")).await.unwrap();

        let err = users.save(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_unknown_columns() {
        let store = InMemoryStore::new();
        let users = store.users();
        let saved = users.save(new_user("a@example.com")).await.unwrap();

        let patch = User {
            id: saved.id,
            display_name: Some("Alice".to_string()),
            ..User::new()
        };
        let updated = users.save(patch).await.unwrap();

        assert_eq!(updated.email.as_deref(), Some("a@example.com"));
        assert_eq!(updated.password_hash, saved.password_hash);
        assert_eq!(updated.display_name.as_deref(), Some("Alice"));
        assert_eq!(updated.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let store = InMemoryStore::new();
        let ghost = User {
            id: Some(404),
            ..new_user("ghost@example.com")
        };

        let err = store.users().save(ghost).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_restricted_by_owned_articles() {
        let store = InMemoryStore::new();
        let owner = store.users().save(new_user("a@example.com")).await.unwrap();
        let owner_id = owner.id.unwrap();

        let mut article = Article::new("Title", "Body");
        article.owner_id = Some(owner_id);
        let article = store.articles().save(article).await.unwrap();

        let err = store.users().delete(owner_id).await.unwrap_err();
        assert!(matches!(err, RepoError::ForeignKeyViolation(_)));
        assert!(store.users().find_by_id(owner_id).await.unwrap().is_some());

        // Detach, then the delete goes through.
        let mut detached = article;
        detached.owner_id = None;
        store.articles().save(detached).await.unwrap();
        store.users().delete(owner_id).await.unwrap();
        assert!(store.users().find_by_id(owner_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_hydrates_children() {
        let store = InMemoryStore::new();
        let owner = store.users().save(new_user("a@example.com")).await.unwrap();
        let owner_id = owner.id.unwrap();

        let mut article = Article::new("Title", "Body");
        article.owner_id = Some(owner_id);
        let article = store.articles().save(article).await.unwrap();

        let mut comment = Comment::new(article.id.unwrap(), "Nice");
        comment.owner_id = Some(owner_id);
        store.comments().save(comment).await.unwrap();

        let found = store.users().find_by_id(owner_id).await.unwrap().unwrap();
        assert_eq!(found.articles.len(), 1);
        assert_eq!(found.comments.len(), 1);
        assert!(found.owns(&found.articles[0]));
    }

    #[tokio::test]
    async fn test_article_delete_cascades_comments() {
        let store = InMemoryStore::new();
        let article = store.articles().save(Article::new("T", "C")).await.unwrap();
        let article_id = article.id.unwrap();
        let comment = store
            .comments()
            .save(Comment::new(article_id, "first"))
            .await
            .unwrap();

        store.articles().delete(article_id).await.unwrap();
        assert!(
            store
                .comments()
                .find_by_id(comment.id.unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_pages_in_id_order() {
        let store = InMemoryStore::new();
        for i in 0..25 {
            store
                .users()
                .save(new_user(&format!("u{i}@example.com")))
                .await
                .unwrap();
        }

        let page = store.users().list(PageRequest::new(3, 10)).await.unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id, Some(21));
    }
}
