use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::error::GroupResult;
use crate::models::{Group, SharedMovie, UpdateGroup};

/// Repository trait for Group persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, group: Group) -> GroupResult<Group>;

    async fn find_all(&self) -> GroupResult<Vec<Group>>;

    async fn find_by_id(&self, id: ObjectId) -> GroupResult<Option<Group>>;

    /// Unknown ids are silently skipped
    async fn find_many(&self, ids: Vec<ObjectId>) -> GroupResult<Vec<Group>>;

    async fn update(&self, id: ObjectId, input: UpdateGroup) -> GroupResult<Option<Group>>;

    async fn delete(&self, id: ObjectId) -> GroupResult<bool>;

    /// `$addToSet` on members; `None` if the group does not exist
    async fn add_member(&self, id: ObjectId, user_id: ObjectId) -> GroupResult<Option<Group>>;

    /// Append to the shared watchlist unless the movie is already on it.
    /// `None` if the group does not exist.
    async fn add_movie(&self, id: ObjectId, entry: SharedMovie) -> GroupResult<Option<Group>>;
}

/// In-memory implementation backed by a `HashMap`
#[derive(Clone, Default)]
pub struct InMemoryGroupRepository {
    groups: Arc<RwLock<HashMap<ObjectId, Group>>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn create(&self, group: Group) -> GroupResult<Group> {
        self.groups.write().await.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_all(&self) -> GroupResult<Vec<Group>> {
        let mut all: Vec<Group> = self.groups.read().await.values().cloned().collect();
        all.sort_by_key(|g| g.id);
        Ok(all)
    }

    async fn find_by_id(&self, id: ObjectId) -> GroupResult<Option<Group>> {
        Ok(self.groups.read().await.get(&id).cloned())
    }

    async fn find_many(&self, ids: Vec<ObjectId>) -> GroupResult<Vec<Group>> {
        let groups = self.groups.read().await;
        Ok(ids.iter().filter_map(|id| groups.get(id).cloned()).collect())
    }

    async fn update(&self, id: ObjectId, input: UpdateGroup) -> GroupResult<Option<Group>> {
        let mut groups = self.groups.write().await;
        Ok(groups.get_mut(&id).map(|group| {
            if let Some(name) = input.name {
                group.name = name;
            }
            group.updated_at = Utc::now();
            group.clone()
        }))
    }

    async fn delete(&self, id: ObjectId) -> GroupResult<bool> {
        Ok(self.groups.write().await.remove(&id).is_some())
    }

    async fn add_member(&self, id: ObjectId, user_id: ObjectId) -> GroupResult<Option<Group>> {
        let mut groups = self.groups.write().await;
        Ok(groups.get_mut(&id).map(|group| {
            if !group.members.contains(&user_id) {
                group.members.push(user_id);
                group.updated_at = Utc::now();
            }
            group.clone()
        }))
    }

    async fn add_movie(&self, id: ObjectId, entry: SharedMovie) -> GroupResult<Option<Group>> {
        let mut groups = self.groups.write().await;
        Ok(groups.get_mut(&id).map(|group| {
            if !group.has_movie(&entry.movie_id) {
                group.shared_watchlist.push(entry);
                group.updated_at = Utc::now();
            }
            group.clone()
        }))
    }
}
