//! MongoDB implementation of MovieRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::MovieResult;
use crate::models::{Movie, Rating, UpdateMovie};
use crate::repository::MovieRepository;

pub const MOVIES_COLLECTION: &str = "movies";

pub struct MongoMovieRepository {
    collection: Collection<Movie>,
}

impl MongoMovieRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Movie>(MOVIES_COLLECTION),
        }
    }

    pub async fn init_indexes(&self) -> MovieResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "group_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_group_id".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Movie indexes created successfully");
        Ok(())
    }

    fn return_updated() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }

    async fn find_sorted(&self, filter: Document) -> MovieResult<Vec<Movie>> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }
}

/// `$set` document for the provided fields, always touching `updated_at`
pub(crate) fn build_set(input: &UpdateMovie) -> Document {
    let mut set = doc! { "updated_at": chrono::Utc::now().to_rfc3339() };
    if let Some(title) = &input.title {
        set.insert("title", title);
    }
    if let Some(genre) = &input.genre {
        set.insert("genre", genre);
    }
    if let Some(year) = input.year {
        set.insert("year", year);
    }
    if let Some(director) = &input.director {
        set.insert("director", director);
    }
    if let Some(added_at) = input.added_at {
        set.insert("added_at", added_at.to_rfc3339());
    }
    set
}

#[async_trait]
impl MovieRepository for MongoMovieRepository {
    #[instrument(skip(self, movie), fields(title = %movie.title))]
    async fn create(&self, movie: Movie) -> MovieResult<Movie> {
        self.collection.insert_one(&movie).await?;

        tracing::info!(movie_id = %movie.id, "Movie created successfully");
        Ok(movie)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> MovieResult<Vec<Movie>> {
        self.find_sorted(doc! {}).await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> MovieResult<Option<Movie>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(&self, ids: Vec<ObjectId>) -> MovieResult<Vec<Movie>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn find_by_group(&self, group_id: ObjectId) -> MovieResult<Vec<Movie>> {
        self.find_sorted(doc! { "group_id": group_id }).await
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: ObjectId, input: UpdateMovie) -> MovieResult<Option<Movie>> {
        let movie = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": build_set(&input) })
            .with_options(Self::return_updated())
            .await?;

        if movie.is_some() {
            tracing::info!(movie_id = %id, "Movie updated successfully");
        }
        Ok(movie)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> MovieResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        let deleted = result.deleted_count > 0;
        if deleted {
            tracing::info!(movie_id = %id, "Movie deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self, rating), fields(user_id = %rating.user_id))]
    async fn add_rating(&self, id: ObjectId, rating: Rating) -> MovieResult<Option<Movie>> {
        let update = doc! {
            "$push": { "ratings": { "user_id": rating.user_id, "rating": rating.rating } },
            "$set": { "updated_at": chrono::Utc::now().to_rfc3339() }
        };

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(Self::return_updated())
            .await?)
    }

    #[instrument(skip(self))]
    async fn set_group(&self, id: ObjectId, group_id: ObjectId) -> MovieResult<Option<Movie>> {
        let update = doc! {
            "$set": {
                "group_id": group_id,
                "updated_at": chrono::Utc::now().to_rfc3339()
            }
        };

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(Self::return_updated())
            .await?)
    }
}
