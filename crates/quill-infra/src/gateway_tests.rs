//! End-to-end checks of the user persistence gateway over the in-memory
//! store with real Argon2 hashing.

use std::sync::Arc;

use quill_core::DomainError;
use quill_core::domain::{Article, Resource, User};
use quill_core::ports::{ArticleRepository, BaseRepository, DataPersister, PasswordService};
use quill_core::services::{PersisterChain, UserDataPersister};
use quill_core::validation::{WriteMode, validate_user_write};

use crate::auth::Argon2PasswordService;
use crate::database::InMemoryStore;

fn gateway(store: &InMemoryStore) -> UserDataPersister {
    UserDataPersister::new(Arc::new(store.users()), Arc::new(Argon2PasswordService::new()))
}

fn registration(email: &str, password: &str) -> User {
    User {
        email: Some(email.to_string()),
        plain_password: Some(password.to_string()),
        password_confirmation: Some(password.to_string()),
        ..User::new()
    }
}

#[tokio::test]
async fn test_saved_hash_verifies_and_plaintext_is_gone() {
    let store = InMemoryStore::new();
    let candidate = registration("jane@example.com", "Abcdef1");
    validate_user_write(&candidate, WriteMode::Create).unwrap();

    let saved = gateway(&store).save(candidate).await.unwrap();

    let hash = saved.password_hash.as_deref().unwrap();
    assert_ne!(hash, "Abcdef1");
    assert!(Argon2PasswordService::new().verify("Abcdef1", hash).unwrap());
    assert!(saved.plain_password.is_none());
    assert!(saved.password_confirmation.is_none());

    let stored = store.users().find_by_id(saved.id.unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, saved.password_hash);
    assert!(stored.plain_password.is_none());
}

#[tokio::test]
async fn test_update_without_password_keeps_hash() {
    let store = InMemoryStore::new();
    let persister = gateway(&store);
    let saved = persister
        .save(registration("jane@example.com", "Abcdef1"))
        .await
        .unwrap();

    let mut edit = saved.clone();
    edit.display_name = Some("Jane".to_string());
    let updated = persister.save(edit).await.unwrap();

    assert_eq!(updated.password_hash, saved.password_hash);
    assert_eq!(updated.display_name.as_deref(), Some("Jane"));
}

#[tokio::test]
async fn test_weak_password_never_reaches_store() {
    let candidate = registration("jane@example.com", "abcdef1");

    let err = validate_user_write(&candidate, WriteMode::Create).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref v) if v[0].field == "password"));
}

#[tokio::test]
async fn test_duplicate_email_conflicts_and_first_record_survives() {
    let store = InMemoryStore::new();
    let persister = gateway(&store);
    let first = persister
        .save(registration("jane@example.com", "Abcdef1"))
        .await
        .unwrap();

    let err = persister
        .save(registration("jane@example.com", "Zyxwvu9"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Duplicate(_)));

    let stored = store.users().find_by_id(first.id.unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, first.password_hash);
    assert_eq!(stored.updated_at, first.updated_at);
}

#[tokio::test]
async fn test_delete_with_children_is_referential_conflict() {
    let store = InMemoryStore::new();
    let persister = gateway(&store);
    let mut owner = persister
        .save(registration("jane@example.com", "Abcdef1"))
        .await
        .unwrap();

    owner.add_article(Article::new("Hello", "World"));
    let article = store
        .articles()
        .save(owner.articles[0].clone())
        .await
        .unwrap();

    let err = persister.delete(&owner).await.unwrap_err();
    assert!(matches!(err, DomainError::Referential(_)));

    let attached = owner.articles[0].clone();
    let detached = owner.remove_article(&attached).unwrap();
    assert_eq!(detached.owner_id, None);
    store
        .articles()
        .save(Article {
            id: article.id,
            ..detached
        })
        .await
        .unwrap();

    persister.delete(&owner).await.unwrap();
    assert!(store.articles().find_by_owner(owner.id.unwrap()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_user_is_not_found() {
    let store = InMemoryStore::new();

    let err = gateway(&store)
        .delete(&User::from_claims(12, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { id: 12, .. }));
}

#[tokio::test]
async fn test_chain_routes_users_to_user_persister() {
    let store = InMemoryStore::new();
    let chain = PersisterChain::new().with(Arc::new(gateway(&store)));

    let stored = chain
        .persist(Resource::User(registration("jane@example.com", "Abcdef1")))
        .await
        .unwrap();
    let Resource::User(user) = stored else {
        panic!("expected a user back");
    };
    assert!(user.id.is_some());

    let err = chain
        .persist(Resource::Article(Article::new("t", "c")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unsupported("article")));
}
