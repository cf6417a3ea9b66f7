//! SeaORM entities backing the store.

pub mod article;
pub mod comment;
pub mod user;
