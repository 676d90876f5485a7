//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use database::mongodb::is_duplicate_key_error;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserChanges, WatchedMovie};
use crate::repository::UserRepository;

pub const USERS_COLLECTION: &str = "users";

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>(USERS_COLLECTION),
        }
    }

    /// Create a repository over a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<User>(collection_name),
        }
    }

    /// Create the unique login index
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "login": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_login_unique".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    fn return_updated() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }

    fn build_set(changes: &UserChanges) -> Document {
        let mut set = doc! { "updated_at": chrono::Utc::now().to_rfc3339() };

        if let Some(ref name) = changes.name {
            set.insert("name", name);
        }
        if let Some(ref login) = changes.login {
            set.insert("login", login);
        }
        if let Some(ref password_hash) = changes.password_hash {
            set.insert("password_hash", password_hash);
        }
        if let Some(ref password_hint) = changes.password_hint {
            set.insert("password_hint", password_hint);
        }

        set
    }

    fn map_write_error(err: mongodb::error::Error, login: &str) -> UserError {
        if is_duplicate_key_error(&err) {
            UserError::DuplicateLogin(login.to_string())
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(login = %user.login))]
    async fn create(&self, user: User) -> UserResult<User> {
        self.collection
            .insert_one(&user)
            .await
            .map_err(|e| Self::map_write_error(e, &user.login))?;

        tracing::info!(user_id = %user.id, "User created successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> UserResult<Vec<User>> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_login(&self, login: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "login": login }).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(&self, ids: Vec<ObjectId>) -> UserResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: ObjectId, changes: UserChanges) -> UserResult<Option<User>> {
        let update = doc! { "$set": Self::build_set(&changes) };
        let login = changes.login.unwrap_or_default();

        let user = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(Self::return_updated())
            .await
            .map_err(|e| Self::map_write_error(e, &login))?;

        if user.is_some() {
            tracing::info!(user_id = %id, "User updated successfully");
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        let deleted = result.deleted_count > 0;
        if deleted {
            tracing::info!(user_id = %id, "User deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn add_to_watchlist(
        &self,
        id: ObjectId,
        movie_id: ObjectId,
    ) -> UserResult<Option<User>> {
        let update = doc! {
            "$addToSet": { "watchlist": movie_id },
            "$set": { "updated_at": chrono::Utc::now().to_rfc3339() }
        };

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(Self::return_updated())
            .await?)
    }

    #[instrument(skip(self, entry), fields(movie_id = %entry.movie_id, rating = entry.rating))]
    async fn mark_as_watched(
        &self,
        id: ObjectId,
        entry: WatchedMovie,
    ) -> UserResult<Option<User>> {
        let update = doc! {
            "$pull": { "watchlist": entry.movie_id },
            "$push": { "watched": { "movie_id": entry.movie_id, "rating": entry.rating } },
            "$inc": { "movies_watched": 1_i64 },
            "$set": { "updated_at": chrono::Utc::now().to_rfc3339() }
        };

        let user = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(Self::return_updated())
            .await?;

        if user.is_some() {
            tracing::info!(user_id = %id, "Movie marked as watched");
        }
        Ok(user)
    }

    #[instrument(skip(self, password_hash))]
    async fn set_password_hash(&self, id: ObjectId, password_hash: String) -> UserResult<bool> {
        let update = doc! {
            "$set": {
                "password_hash": password_hash,
                "updated_at": chrono::Utc::now().to_rfc3339()
            }
        };
        let result = self.collection.update_one(doc! { "_id": id }, update).await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn join_group(&self, id: ObjectId, group_id: ObjectId) -> UserResult<bool> {
        let update = doc! {
            "$addToSet": { "groups": group_id },
            "$set": { "updated_at": chrono::Utc::now().to_rfc3339() }
        };
        let result = self.collection.update_one(doc! { "_id": id }, update).await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn increment_movies_added(&self, id: ObjectId) -> UserResult<bool> {
        let update = doc! { "$inc": { "movies_added": 1_i64 } };
        let result = self.collection.update_one(doc! { "_id": id }, update).await?;
        Ok(result.matched_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_set_always_touches_updated_at() {
        let set = MongoUserRepository::build_set(&UserChanges::default());
        assert_eq!(set.len(), 1);
        assert!(set.contains_key("updated_at"));
    }

    #[test]
    fn test_build_set_only_includes_provided_fields() {
        let set = MongoUserRepository::build_set(&UserChanges {
            name: Some("Alicia".into()),
            password_hash: Some("$argon2id$x".into()),
            ..Default::default()
        });

        assert_eq!(set.get_str("name").unwrap(), "Alicia");
        assert!(set.contains_key("password_hash"));
        assert!(!set.contains_key("login"));
        assert!(!set.contains_key("password_hint"));
    }
}
