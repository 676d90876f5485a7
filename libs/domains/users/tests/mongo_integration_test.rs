//! Integration tests for the MongoDB user repository
//!
//! These tests use a real MongoDB via testcontainers to ensure:
//! - The unique login index rejects duplicates
//! - Atomic update expressions behave like the in-memory repository

use domain_users::*;
use ::mongodb::bson::oid::ObjectId;
use test_utils::{TestDataBuilder, TestMongo, assertions::*};

async fn repository(mongo: &TestMongo, builder: &TestDataBuilder) -> MongoUserRepository {
    let repo = MongoUserRepository::new(&mongo.database(&builder.database_name()));
    repo.init_indexes().await.unwrap();
    repo
}

fn user(builder: &TestDataBuilder, base: &str) -> User {
    User::new(
        base.to_string(),
        builder.login(base),
        "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        Some("hint".to_string()),
    )
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_and_find_user() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_create_find");
    let repo = repository(&mongo, &builder).await;

    let created = repo.create(user(&builder, "alice")).await.unwrap();

    let by_id = assert_some(repo.find_by_id(created.id).await.unwrap(), "user by id");
    assert_eq!(by_id.login, created.login);
    assert_eq!(by_id.password_hint.as_deref(), Some("hint"));

    let by_login = assert_some(
        repo.find_by_login(&created.login).await.unwrap(),
        "user by login",
    );
    assert_eq!(by_login.id, created.id);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_unique_login_index() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_unique_login");
    let repo = repository(&mongo, &builder).await;

    repo.create(user(&builder, "alice")).await.unwrap();
    let result = repo.create(user(&builder, "alice")).await;

    assert!(matches!(result, Err(UserError::DuplicateLogin(_))));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_watchlist_and_watched_updates() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_watchlist");
    let repo = repository(&mongo, &builder).await;
    let created = repo.create(user(&builder, "alice")).await.unwrap();
    let movie = ObjectId::new();

    repo.add_to_watchlist(created.id, movie).await.unwrap();
    let updated = assert_some(
        repo.add_to_watchlist(created.id, movie).await.unwrap(),
        "watchlist update",
    );
    assert_contains_once(&updated.watchlist, &movie, "watchlist");

    let watched = assert_some(
        repo.mark_as_watched(created.id, WatchedMovie { movie_id: movie, rating: 3 })
            .await
            .unwrap(),
        "watched update",
    );
    assert!(watched.watchlist.is_empty());
    assert_eq!(watched.watched.len(), 1);
    assert_eq!(watched.movies_watched, 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_back_references_and_counters() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_backrefs");
    let repo = repository(&mongo, &builder).await;
    let created = repo.create(user(&builder, "alice")).await.unwrap();
    let group = ObjectId::new();

    assert!(repo.join_group(created.id, group).await.unwrap());
    assert!(repo.join_group(created.id, group).await.unwrap());
    assert!(repo.increment_movies_added(created.id).await.unwrap());
    assert!(!repo.join_group(ObjectId::new(), group).await.unwrap());

    let stored = assert_some(repo.find_by_id(created.id).await.unwrap(), "user");
    assert_contains_once(&stored.groups, &group, "groups");
    assert_eq!(stored.movies_added, 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_and_delete() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_update_delete");
    let repo = repository(&mongo, &builder).await;
    let created = repo.create(user(&builder, "alice")).await.unwrap();

    let updated = repo
        .update(
            created.id,
            UserChanges {
                name: Some("Alicia".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(assert_some(updated, "updated user").name, "Alicia");

    assert!(repo.update(ObjectId::new(), UserChanges::default()).await.unwrap().is_none());
    assert!(repo.delete(created.id).await.unwrap());
    assert!(!repo.delete(created.id).await.unwrap());
}
