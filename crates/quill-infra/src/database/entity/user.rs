//! User entity for SeaORM.

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub roles: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::article::Entity")]
    Article,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User. Children are loaded separately.
impl From<Model> for quill_core::domain::User {
    fn from(model: Model) -> Self {
        let roles = serde_json::from_value(model.roles).unwrap_or_else(|e| {
            tracing::warn!(user_id = model.id, error = %e, "Unreadable roles column, treating as empty");
            Vec::new()
        });

        Self {
            id: Some(model.id),
            email: Some(model.email),
            display_name: model.display_name,
            password_hash: Some(model.password_hash),
            roles,
            created_at: Some(model.created_at.into()),
            updated_at: Some(model.updated_at.into()),
            ..Self::default()
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
///
/// A user without id becomes an insert. Unknown email or hash are left
/// `NotSet` so an update never blanks them.
impl From<quill_core::domain::User> for ActiveModel {
    fn from(user: quill_core::domain::User) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: user.id.map_or(NotSet, Set),
            email: user.email.map_or(NotSet, Set),
            display_name: Set(user.display_name),
            password_hash: user.password_hash.map_or(NotSet, Set),
            roles: Set(serde_json::json!(user.roles)),
            created_at: if user.id.is_none() {
                Set(now.into())
            } else {
                NotSet
            },
            updated_at: Set(now.into()),
        }
    }
}
