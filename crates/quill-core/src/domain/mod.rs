//! Domain entities - the core business objects.

mod article;
mod comment;
mod ownership;
mod user;

pub use article::Article;
pub use comment::Comment;
pub use ownership::OwnedChild;
pub use user::{BASELINE_ROLE, User};

/// A record handed to the persistence layer, tagged with its kind.
#[derive(Debug, Clone)]
pub enum Resource {
    User(User),
    Article(Article),
    Comment(Comment),
}

impl Resource {
    /// Kind name, used in logs and dispatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::User(_) => "user",
            Resource::Article(_) => "article",
            Resource::Comment(_) => "comment",
        }
    }
}
