use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ownership::{self, OwnedChild};
use super::{Article, Comment};

/// Role implicitly granted to every user, whatever is stored.
pub const BASELINE_ROLE: &str = "ROLE_USER";

/// User entity - the persisted identity record.
///
/// `plain_password` and `password_confirmation` only live for the duration of
/// a write request and are never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password_hash: Option<String>,
    #[serde(skip)]
    pub plain_password: Option<String>,
    #[serde(skip)]
    pub password_confirmation: Option<String>,
    pub roles: Vec<String>,
    pub articles: Vec<Article>,
    pub comments: Vec<Comment>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create an empty, unsaved user.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stand-in from identity token claims, without a store lookup.
    ///
    /// Only the id and roles are known; every other field stays unset.
    pub fn from_claims(id: i64, roles: Vec<String>) -> Self {
        Self {
            id: Some(id),
            roles,
            ..Self::default()
        }
    }

    /// Whether the store has not assigned an id yet.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Login identifier exposed to the outside world.
    pub fn user_identifier(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    /// Stored roles plus the baseline role, de-duplicated.
    pub fn effective_roles(&self) -> BTreeSet<String> {
        self.roles
            .iter()
            .cloned()
            .chain(std::iter::once(BASELINE_ROLE.to_string()))
            .collect()
    }

    pub fn has_role(&self, role: &str) -> bool {
        role == BASELINE_ROLE || self.roles.iter().any(|r| r == role)
    }

    /// True when a write request carried a new plaintext password.
    pub fn has_plain_password(&self) -> bool {
        self.plain_password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Drop any transient credential material.
    pub fn erase_credentials(&mut self) {
        self.plain_password = None;
        self.password_confirmation = None;
    }

    /// Attach an article to this user. No-op if it is already attached,
    /// which for unsaved drafts means one with the same title and content.
    pub fn add_article(&mut self, article: Article) -> bool {
        ownership::attach(&mut self.articles, self.id, article)
    }

    /// Detach an article, returning it with its owner cleared.
    pub fn remove_article(&mut self, article: &Article) -> Option<Article> {
        ownership::detach(&mut self.articles, article)
    }

    pub fn add_comment(&mut self, comment: Comment) -> bool {
        ownership::attach(&mut self.comments, self.id, comment)
    }

    pub fn remove_comment(&mut self, comment: &Comment) -> Option<Comment> {
        ownership::detach(&mut self.comments, comment)
    }

    /// Re-stamp the owner reference of every child with the current id.
    pub fn rebind_children(&mut self) {
        ownership::rebind(&mut self.articles, self.id);
        ownership::rebind(&mut self.comments, self.id);
    }

    /// Whether `child` is attached to this user, per the child's back-reference.
    pub fn owns<T: OwnedChild>(&self, child: &T) -> bool {
        self.id.is_some() && child.owner_id() == self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_user(id: i64) -> User {
        User {
            id: Some(id),
            email: Some(format!("user{id}@example.com")),
            ..User::new()
        }
    }

    #[test]
    fn test_new_user_defaults_to_baseline_role_only() {
        let user = User::new();

        let roles = user.effective_roles();
        assert_eq!(roles.len(), 1);
        assert!(roles.contains("ROLE_USER"));
        assert!(!roles.contains("ROLE_ADMIN"));
        assert!(!user.has_role("ROLE_ADMIN"));
    }

    #[test]
    fn test_effective_roles_deduplicates() {
        let user = User {
            roles: vec![
                "ROLE_EDITOR".to_string(),
                "ROLE_USER".to_string(),
                "ROLE_EDITOR".to_string(),
            ],
            ..User::new()
        };

        let roles: Vec<_> = user.effective_roles().into_iter().collect();
        assert_eq!(roles, vec!["ROLE_EDITOR".to_string(), "ROLE_USER".to_string()]);
    }

    #[test]
    fn test_from_claims_leaves_everything_else_unknown() {
        let user = User::from_claims(42, vec!["ROLE_EDITOR".to_string()]);

        assert_eq!(user.id, Some(42));
        assert_eq!(user.roles, vec!["ROLE_EDITOR".to_string()]);
        assert!(user.email.is_none());
        assert!(user.display_name.is_none());
        assert!(user.password_hash.is_none());
        assert!(user.created_at.is_none());
        assert!(user.articles.is_empty());
        assert_eq!(user.user_identifier(), "");
    }

    #[test]
    fn test_add_article_sets_back_reference() {
        let mut user = saved_user(7);
        let article = Article {
            id: Some(1),
            ..Article::new("Title", "Body")
        };

        assert!(user.add_article(article.clone()));
        assert_eq!(user.articles.len(), 1);
        assert_eq!(user.articles[0].owner_id, Some(7));
        assert!(user.owns(&user.articles[0]));

        // Second add of the same child is a no-op.
        assert!(!user.add_article(article));
        assert_eq!(user.articles.len(), 1);
    }

    #[test]
    fn test_remove_article_clears_back_reference() {
        let mut user = saved_user(7);
        let article = Article {
            id: Some(1),
            ..Article::new("Title", "Body")
        };
        user.add_article(article.clone());

        let removed = user.remove_article(&article).unwrap();
        assert_eq!(removed.owner_id, None);
        assert!(user.articles.is_empty());

        assert!(user.remove_article(&article).is_none());
    }

    #[test]
    fn test_unsaved_children_compare_by_content() {
        let mut user = saved_user(3);

        assert!(user.add_comment(Comment::new(10, "first!")));
        assert!(!user.add_comment(Comment::new(10, "first!")));
        assert!(user.add_comment(Comment::new(10, "second")));
        assert_eq!(user.comments.len(), 2);

        let removed = user.remove_comment(&Comment::new(10, "first!")).unwrap();
        assert_eq!(removed.owner_id, None);
        assert_eq!(user.comments.len(), 1);
    }

    #[test]
    fn test_identical_drafts_collapse_until_saved() {
        let mut user = saved_user(3);

        assert!(user.add_article(Article::new("Draft", "same body")));
        assert!(!user.add_article(Article::new("Draft", "same body")));
        assert_eq!(user.articles.len(), 1);

        // Once the first draft has an id, an identical draft is a new child.
        user.articles[0].id = Some(40);
        assert!(user.add_article(Article::new("Draft", "same body")));
        assert_eq!(user.articles.len(), 2);
        assert!(user.articles.iter().all(|a| a.owner_id == Some(3)));
    }

    #[test]
    fn test_rebind_children_after_id_assignment() {
        let mut user = User::new();
        user.add_article(Article::new("Draft", "..."));
        assert_eq!(user.articles[0].owner_id, None);

        user.id = Some(99);
        user.rebind_children();
        assert_eq!(user.articles[0].owner_id, Some(99));
    }

    #[test]
    fn test_erase_credentials() {
        let mut user = User {
            plain_password: Some("Abcdef1".to_string()),
            password_confirmation: Some("Abcdef1".to_string()),
            ..User::new()
        };
        assert!(user.has_plain_password());

        user.erase_credentials();
        assert!(user.plain_password.is_none());
        assert!(user.password_confirmation.is_none());
        assert!(!user.has_plain_password());
    }
}
