//! Integration tests for the MongoDB group repository

use domain_groups::*;
use ::mongodb::bson::oid::ObjectId;
use test_utils::{TestDataBuilder, TestMongo, assertions::*};

async fn repository(mongo: &TestMongo, builder: &TestDataBuilder) -> MongoGroupRepository {
    let repo = MongoGroupRepository::new(&mongo.database(&builder.database_name()));
    repo.init_indexes().await.unwrap();
    repo
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_find_and_rename() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_group_crud");
    let repo = repository(&mongo, &builder).await;
    let creator = ObjectId::new();

    let group = repo
        .create(Group::new(builder.name("group", "night"), creator))
        .await
        .unwrap();

    let found = assert_some(repo.find_by_id(group.id).await.unwrap(), "group by id");
    assert_eq!(found.members, vec![creator]);

    let renamed = assert_some(
        repo.update(group.id, UpdateGroup { name: Some("Film Club".into()) })
            .await
            .unwrap(),
        "renamed group",
    );
    assert_eq!(renamed.name, "Film Club");
    assert!(renamed.updated_at >= group.updated_at);

    let many = repo
        .find_many(vec![group.id, ObjectId::new()])
        .await
        .unwrap();
    assert_eq!(many.len(), 1);

    assert!(repo.delete(group.id).await.unwrap());
    assert!(!repo.delete(group.id).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_add_member_is_a_set() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_group_members");
    let repo = repository(&mongo, &builder).await;
    let creator = ObjectId::new();
    let friend = ObjectId::new();
    let group = repo
        .create(Group::new(builder.name("group", "members"), creator))
        .await
        .unwrap();

    repo.add_member(group.id, friend).await.unwrap();
    let updated = assert_some(
        repo.add_member(group.id, friend).await.unwrap(),
        "group after second add",
    );

    assert_eq!(updated.members, vec![creator, friend]);
    assert!(repo.add_member(ObjectId::new(), friend).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_add_movie_keeps_first_recommender() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_group_movies");
    let repo = repository(&mongo, &builder).await;
    let alice = ObjectId::new();
    let bob = ObjectId::new();
    let movie = ObjectId::new();
    let group = repo
        .create(Group::new(builder.name("group", "movies"), alice))
        .await
        .unwrap();

    let first = assert_some(
        repo.add_movie(group.id, SharedMovie { movie_id: movie, recommended_by: alice })
            .await
            .unwrap(),
        "group after first recommendation",
    );
    assert_eq!(
        first.shared_watchlist,
        vec![SharedMovie { movie_id: movie, recommended_by: alice }]
    );
    let updated = assert_some(
        repo.add_movie(group.id, SharedMovie { movie_id: movie, recommended_by: bob })
            .await
            .unwrap(),
        "group after second recommendation",
    );

    assert_eq!(
        updated.shared_watchlist,
        vec![SharedMovie { movie_id: movie, recommended_by: alice }]
    );
    assert!(
        repo.add_movie(ObjectId::new(), SharedMovie { movie_id: movie, recommended_by: bob })
            .await
            .unwrap()
            .is_none()
    );
}
