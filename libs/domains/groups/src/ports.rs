//! Lookups this domain needs from the movie catalog.
//!
//! The movies crate depends on this one, so titles are resolved through a
//! trait that the movies crate implements.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::GroupResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieTitles: Send + Sync {
    /// Titles keyed by movie id; unknown ids are absent from the map
    async fn titles(&self, ids: Vec<ObjectId>) -> GroupResult<HashMap<ObjectId, String>>;
}

/// Fixed title table, for wiring a group service without a movie catalog
#[cfg(any(test, feature = "testing"))]
#[derive(Clone, Default)]
pub struct StaticMovieTitles {
    titles: std::sync::Arc<tokio::sync::RwLock<HashMap<ObjectId, String>>>,
}

#[cfg(any(test, feature = "testing"))]
impl StaticMovieTitles {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: ObjectId, title: impl Into<String>) {
        self.titles.write().await.insert(id, title.into());
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl MovieTitles for StaticMovieTitles {
    async fn titles(&self, ids: Vec<ObjectId>) -> GroupResult<HashMap<ObjectId, String>> {
        let titles = self.titles.read().await;
        Ok(ids
            .into_iter()
            .filter_map(|id| titles.get(&id).map(|t| (id, t.clone())))
            .collect())
    }
}
