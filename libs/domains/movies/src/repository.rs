use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::error::MovieResult;
use crate::models::{Movie, Rating, UpdateMovie};

/// Repository trait for Movie persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn create(&self, movie: Movie) -> MovieResult<Movie>;

    async fn find_all(&self) -> MovieResult<Vec<Movie>>;

    async fn find_by_id(&self, id: ObjectId) -> MovieResult<Option<Movie>>;

    /// Unknown ids are silently skipped
    async fn find_many(&self, ids: Vec<ObjectId>) -> MovieResult<Vec<Movie>>;

    async fn find_by_group(&self, group_id: ObjectId) -> MovieResult<Vec<Movie>>;

    async fn update(&self, id: ObjectId, input: UpdateMovie) -> MovieResult<Option<Movie>>;

    async fn delete(&self, id: ObjectId) -> MovieResult<bool>;

    /// `$push` onto ratings; `None` if the movie does not exist
    async fn add_rating(&self, id: ObjectId, rating: Rating) -> MovieResult<Option<Movie>>;

    async fn set_group(&self, id: ObjectId, group_id: ObjectId) -> MovieResult<Option<Movie>>;
}

/// In-memory implementation backed by a `HashMap`
#[derive(Clone, Default)]
pub struct InMemoryMovieRepository {
    movies: Arc<RwLock<HashMap<ObjectId, Movie>>>,
}

impl InMemoryMovieRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn create(&self, movie: Movie) -> MovieResult<Movie> {
        self.movies.write().await.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn find_all(&self) -> MovieResult<Vec<Movie>> {
        let mut all: Vec<Movie> = self.movies.read().await.values().cloned().collect();
        all.sort_by_key(|m| m.id);
        Ok(all)
    }

    async fn find_by_id(&self, id: ObjectId) -> MovieResult<Option<Movie>> {
        Ok(self.movies.read().await.get(&id).cloned())
    }

    async fn find_many(&self, ids: Vec<ObjectId>) -> MovieResult<Vec<Movie>> {
        let movies = self.movies.read().await;
        Ok(ids.iter().filter_map(|id| movies.get(id).cloned()).collect())
    }

    async fn find_by_group(&self, group_id: ObjectId) -> MovieResult<Vec<Movie>> {
        let mut found: Vec<Movie> = self
            .movies
            .read()
            .await
            .values()
            .filter(|m| m.group_id == Some(group_id))
            .cloned()
            .collect();
        found.sort_by_key(|m| m.id);
        Ok(found)
    }

    async fn update(&self, id: ObjectId, input: UpdateMovie) -> MovieResult<Option<Movie>> {
        let mut movies = self.movies.write().await;
        Ok(movies.get_mut(&id).map(|movie| {
            movie.apply_update(input);
            movie.clone()
        }))
    }

    async fn delete(&self, id: ObjectId) -> MovieResult<bool> {
        Ok(self.movies.write().await.remove(&id).is_some())
    }

    async fn add_rating(&self, id: ObjectId, rating: Rating) -> MovieResult<Option<Movie>> {
        let mut movies = self.movies.write().await;
        Ok(movies.get_mut(&id).map(|movie| {
            movie.ratings.push(rating);
            movie.updated_at = Utc::now();
            movie.clone()
        }))
    }

    async fn set_group(&self, id: ObjectId, group_id: ObjectId) -> MovieResult<Option<Movie>> {
        let mut movies = self.movies.write().await;
        Ok(movies.get_mut(&id).map(|movie| {
            movie.group_id = Some(group_id);
            movie.updated_at = Utc::now();
            movie.clone()
        }))
    }
}
