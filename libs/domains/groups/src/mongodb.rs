//! MongoDB implementation of GroupRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::GroupResult;
use crate::models::{Group, SharedMovie, UpdateGroup};
use crate::repository::GroupRepository;

pub const GROUPS_COLLECTION: &str = "groups";

pub struct MongoGroupRepository {
    collection: Collection<Group>,
}

impl MongoGroupRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Group>(GROUPS_COLLECTION),
        }
    }

    /// Index members so "groups of a user" lookups stay cheap
    pub async fn init_indexes(&self) -> GroupResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "members": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_members".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Group indexes created successfully");
        Ok(())
    }

    fn return_updated() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }
}

#[async_trait]
impl GroupRepository for MongoGroupRepository {
    #[instrument(skip(self, group), fields(group_name = %group.name))]
    async fn create(&self, group: Group) -> GroupResult<Group> {
        self.collection.insert_one(&group).await?;

        tracing::info!(group_id = %group.id, "Group created successfully");
        Ok(group)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> GroupResult<Vec<Group>> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> GroupResult<Option<Group>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(&self, ids: Vec<ObjectId>) -> GroupResult<Vec<Group>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: ObjectId, input: UpdateGroup) -> GroupResult<Option<Group>> {
        let mut set = doc! { "updated_at": chrono::Utc::now().to_rfc3339() };
        if let Some(name) = input.name {
            set.insert("name", name);
        }

        let group = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .with_options(Self::return_updated())
            .await?;

        if group.is_some() {
            tracing::info!(group_id = %id, "Group updated successfully");
        }
        Ok(group)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> GroupResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        let deleted = result.deleted_count > 0;
        if deleted {
            tracing::info!(group_id = %id, "Group deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn add_member(&self, id: ObjectId, user_id: ObjectId) -> GroupResult<Option<Group>> {
        let update = doc! {
            "$addToSet": { "members": user_id },
            "$set": { "updated_at": chrono::Utc::now().to_rfc3339() }
        };

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(Self::return_updated())
            .await?)
    }

    #[instrument(skip(self, entry), fields(movie_id = %entry.movie_id))]
    async fn add_movie(&self, id: ObjectId, entry: SharedMovie) -> GroupResult<Option<Group>> {
        // Matches only while the movie is absent from the list
        let filter = doc! {
            "_id": id,
            "shared_watchlist.movie_id": { "$ne": entry.movie_id }
        };
        let update = doc! {
            "$push": {
                "shared_watchlist": {
                    "movie_id": entry.movie_id,
                    "recommended_by": entry.recommended_by
                }
            },
            "$set": { "updated_at": chrono::Utc::now().to_rfc3339() }
        };

        let added = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(Self::return_updated())
            .await?;

        match added {
            Some(group) => {
                tracing::info!(group_id = %id, movie_id = %entry.movie_id, "Movie added to group");
                Ok(Some(group))
            }
            // Already listed, or no such group
            None => self.find_by_id(id).await,
        }
    }
}
