use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ownership::OwnedChild;

/// Comment entity - a user's reply on an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<i64>,
    pub owner_id: Option<i64>,
    pub article_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(article_id: i64, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            owner_id: None,
            article_id,
            body: body.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedChild for Comment {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn owner_id(&self) -> Option<i64> {
        self.owner_id
    }

    fn set_owner_id(&mut self, owner_id: Option<i64>) {
        self.owner_id = owner_id;
    }

    fn same_entity(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.article_id == other.article_id && self.body == other.body,
            _ => false,
        }
    }
}
