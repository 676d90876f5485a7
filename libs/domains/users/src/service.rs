//! User Service - directory operations and credential workflows

use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use tracing::instrument;
use validator::Validate;

use crate::credentials::{hash_password, validate_password, verify_password};
use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, MAX_RATING, MIN_RATING, UpdateUser, User, UserChanges, WatchedMovie,
};
use crate::repository::UserRepository;

/// User service providing business logic operations
///
/// Generic over the repository so other domains can hold it as
/// `UserService<dyn UserRepository>`.
pub struct UserService<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}

impl<R: UserRepository + 'static> UserService<R> {
    /// Type-erased handle sharing the same repository
    pub fn as_dyn(&self) -> UserService<dyn UserRepository> {
        let repository: Arc<dyn UserRepository> = self.repository.clone();
        UserService { repository }
    }
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn from_arc(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, input), fields(login = %input.login))]
    pub async fn create(&self, input: CreateUser) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let password_hash = hash_password(&input.password)?;
        let user = User::new(input.name, input.login, password_hash, input.password_hint);

        self.repository.create(user).await
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> UserResult<Vec<User>> {
        self.repository.find_all().await
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: ObjectId) -> UserResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn find_by_login(&self, login: &str) -> UserResult<User> {
        self.repository
            .find_by_login(login)
            .await?
            .ok_or_else(|| UserError::LoginNotFound(login.to_string()))
    }

    /// Users for the given ids, in store order; unknown ids are skipped
    #[instrument(skip(self, ids))]
    pub async fn find_many(&self, ids: Vec<ObjectId>) -> UserResult<Vec<User>> {
        self.repository.find_many(ids).await
    }

    /// Merge the provided fields; a new password is re-hashed.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: ObjectId, input: UpdateUser) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let password_hash = match input.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };

        let changes = UserChanges {
            name: input.name,
            login: input.login,
            password_hash,
            password_hint: input.password_hint,
        };

        self.repository
            .update(id, changes)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: ObjectId) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    /// Idempotent: a movie already on the list is not added twice
    #[instrument(skip(self))]
    pub async fn add_to_watchlist(&self, id: ObjectId, movie_id: ObjectId) -> UserResult<User> {
        self.repository
            .add_to_watchlist(id, movie_id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn mark_as_watched(
        &self,
        id: ObjectId,
        movie_id: ObjectId,
        rating: i32,
    ) -> UserResult<User> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(UserError::Validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        self.repository
            .mark_as_watched(id, WatchedMovie { movie_id, rating })
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Replace the password when the supplied hint matches the stored one
    /// exactly. On mismatch the stored hash is left untouched.
    #[instrument(skip(self, password_hint, new_password))]
    pub async fn reset_credential(
        &self,
        login: &str,
        password_hint: &str,
        new_password: &str,
    ) -> UserResult<()> {
        let user = self.find_by_login(login).await?;

        if user.password_hint.as_deref() != Some(password_hint) {
            tracing::warn!(user_id = %user.id, "Password reset rejected: hint mismatch");
            return Err(UserError::IncorrectHint);
        }

        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        if !self.repository.set_password_hash(user.id, password_hash).await? {
            return Err(UserError::NotFound(user.id));
        }

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    /// `None` for an unknown login or a wrong password.
    #[instrument(skip(self, password))]
    pub async fn validate_credential(&self, login: &str, password: &str) -> UserResult<Option<User>> {
        let Some(user) = self.repository.find_by_login(login).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Record the group back-reference on the user
    #[instrument(skip(self))]
    pub async fn join_group(&self, id: ObjectId, group_id: ObjectId) -> UserResult<()> {
        if !self.repository.join_group(id, group_id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn record_movie_added(&self, id: ObjectId) -> UserResult<()> {
        if !self.repository.increment_movies_added(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }
}

impl<R: UserRepository + ?Sized> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
