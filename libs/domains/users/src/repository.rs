use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserChanges, WatchedMovie};

/// Repository trait for User persistence
///
/// Every mutation is a single-document atomic operation; `None`/`false`
/// results mean the user id did not match any document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `DuplicateLogin` if the login is taken.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn find_all(&self) -> UserResult<Vec<User>>;

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    async fn find_by_login(&self, login: &str) -> UserResult<Option<User>>;

    /// Fetch several users at once; unknown ids are silently skipped
    async fn find_many(&self, ids: Vec<ObjectId>) -> UserResult<Vec<User>>;

    async fn update(&self, id: ObjectId, changes: UserChanges) -> UserResult<Option<User>>;

    async fn delete(&self, id: ObjectId) -> UserResult<bool>;

    /// `$addToSet` on the watchlist
    async fn add_to_watchlist(&self, id: ObjectId, movie_id: ObjectId)
    -> UserResult<Option<User>>;

    /// Pull from the watchlist, push onto watched and bump the counter in one update
    async fn mark_as_watched(&self, id: ObjectId, entry: WatchedMovie)
    -> UserResult<Option<User>>;

    async fn set_password_hash(&self, id: ObjectId, password_hash: String) -> UserResult<bool>;

    /// `$addToSet` on the user's group back-references
    async fn join_group(&self, id: ObjectId, group_id: ObjectId) -> UserResult<bool>;

    async fn increment_movies_added(&self, id: ObjectId) -> UserResult<bool>;
}

/// In-memory implementation backed by a `HashMap`, with the same
/// observable semantics as the MongoDB repository.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<ObjectId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn login_taken(users: &HashMap<ObjectId, User>, login: &str, except: Option<ObjectId>) -> bool {
        users
            .values()
            .any(|u| u.login == login && Some(u.id) != except)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;
        if Self::login_taken(&users, &user.login, None) {
            return Err(UserError::DuplicateLogin(user.login));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.id);
        Ok(all)
    }

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.login == login).cloned())
    }

    async fn find_many(&self, ids: Vec<ObjectId>) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn update(&self, id: ObjectId, changes: UserChanges) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;
        if let Some(ref login) = changes.login {
            if Self::login_taken(&users, login, Some(id)) {
                return Err(UserError::DuplicateLogin(login.clone()));
            }
        }
        Ok(users.get_mut(&id).map(|user| {
            user.apply_changes(changes);
            user.clone()
        }))
    }

    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn add_to_watchlist(
        &self,
        id: ObjectId,
        movie_id: ObjectId,
    ) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            if !user.watchlist.contains(&movie_id) {
                user.watchlist.push(movie_id);
            }
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn mark_as_watched(
        &self,
        id: ObjectId,
        entry: WatchedMovie,
    ) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.watchlist.retain(|m| *m != entry.movie_id);
            user.watched.push(entry);
            user.movies_watched += 1;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_password_hash(&self, id: ObjectId, password_hash: String) -> UserResult<bool> {
        let mut users = self.users.write().await;
        Ok(users
            .get_mut(&id)
            .map(|user| {
                user.password_hash = password_hash;
                user.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn join_group(&self, id: ObjectId, group_id: ObjectId) -> UserResult<bool> {
        let mut users = self.users.write().await;
        Ok(users
            .get_mut(&id)
            .map(|user| {
                if !user.groups.contains(&group_id) {
                    user.groups.push(group_id);
                }
            })
            .is_some())
    }

    async fn increment_movies_added(&self, id: ObjectId) -> UserResult<bool> {
        let mut users = self.users.write().await;
        Ok(users
            .get_mut(&id)
            .map(|user| user.movies_added += 1)
            .is_some())
    }
}
