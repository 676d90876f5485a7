//! Movie titles for the groups domain

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain_groups::{GroupError, GroupResult, MovieTitles};
use mongodb::bson::oid::ObjectId;

use crate::error::MovieError;
use crate::repository::MovieRepository;

/// [`MovieTitles`] backed by the movie repository
pub struct MovieTitleLookup<R: MovieRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: MovieRepository + ?Sized> MovieTitleLookup<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: MovieRepository + ?Sized> MovieTitles for MovieTitleLookup<R> {
    async fn titles(&self, ids: Vec<ObjectId>) -> GroupResult<HashMap<ObjectId, String>> {
        let movies = self.repository.find_many(ids).await.map_err(|e| match e {
            MovieError::Database(msg) => GroupError::Database(msg),
            other => GroupError::Internal(other.to_string()),
        })?;

        Ok(movies.into_iter().map(|m| (m.id, m.title)).collect())
    }
}
