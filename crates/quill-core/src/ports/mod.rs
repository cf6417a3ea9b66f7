//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod persister;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use persister::DataPersister;
pub use repository::{
    ArticleRepository, BaseRepository, CommentRepository, MAX_OFFSET, PageRequest, Paginated,
    UserRepository,
};
