use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ownership::OwnedChild;

/// Article entity - a piece of content written by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Option<i64>,
    pub owner_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Create a new, unsaved and unowned article.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            owner_id: None,
            title: title.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedChild for Article {
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
            (None, None) => self.title == other.title && self.content == other.content,
            _ => false,
        }
    }
}
