//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait, TryIntoModel,
};

use quill_core::domain::{Article, Comment, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    ArticleRepository, BaseRepository, CommentRepository, PageRequest, Paginated, UserRepository,
};

use super::entity::article::{self, Entity as ArticleEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::error_mapping::map_db_err;
use super::mask_email;
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL article repository.
pub type PostgresArticleRepository = PostgresBaseRepository<ArticleEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL user repository. Lookups also load the user's articles and
/// comments.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Turn user rows into domain users, loading children in two batched queries.
async fn hydrate<C>(db: &C, models: Vec<user::Model>) -> Result<Vec<User>, RepoError>
where
    C: ConnectionTrait,
{
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();

    let mut articles: HashMap<i64, Vec<Article>> = HashMap::new();
    for row in ArticleEntity::find()
        .filter(article::Column::OwnerId.is_in(ids.clone()))
        .order_by_asc(article::Column::Id)
        .all(db)
        .await
        .map_err(map_db_err)?
    {
        if let Some(owner) = row.owner_id {
            articles.entry(owner).or_default().push(row.into());
        }
    }

    let mut comments: HashMap<i64, Vec<Comment>> = HashMap::new();
    for row in CommentEntity::find()
        .filter(comment::Column::OwnerId.is_in(ids))
        .order_by_asc(comment::Column::Id)
        .all(db)
        .await
        .map_err(map_db_err)?
    {
        if let Some(owner) = row.owner_id {
            comments.entry(owner).or_default().push(row.into());
        }
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let id = model.id;
            let mut user: User = model.into();
            user.articles = articles.remove(&id).unwrap_or_default();
            user.comments = comments.remove(&id).unwrap_or_default();
            user
        })
        .collect())
}

#[async_trait]
impl BaseRepository<User, i64> for PostgresUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let Some(model) = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(hydrate(&self.db, vec![model]).await?.pop())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let articles = user.articles.clone();
        let comments = user.comments.clone();
        let active_model: user::ActiveModel = user.into();

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let saved = active_model.save(&txn).await.map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        let model = saved
            .try_into_model()
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let mut stored: User = model.into();
        stored.articles = articles;
        stored.comments = comments;
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let result = UserEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let Some(model) = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(hydrate(&self.db, vec![model]).await?.pop())
    }

    async fn list(&self, page: PageRequest) -> Result<Paginated<User>, RepoError> {
        let total = UserEntity::find().count(&self.db).await.map_err(map_db_err)?;
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .offset(page.offset())
            .limit(page.per_page)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(Paginated {
            items: hydrate(&self.db, models).await?,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }
}

#[async_trait]
impl ArticleRepository for PostgresArticleRepository {
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Article>, RepoError> {
        let result = ArticleEntity::find()
            .filter(article::Column::OwnerId.eq(owner_id))
            .order_by_asc(article::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::OwnerId.eq(owner_id))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
