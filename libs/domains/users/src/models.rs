use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// One entry of a user's watch history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedMovie {
    pub movie_id: ObjectId,
    pub rating: i32,
}

/// User document as stored in the `users` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    /// Unique across all users
    pub login: String,
    /// Argon2 PHC string
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hint: Option<String>,
    #[serde(default)]
    pub groups: Vec<ObjectId>,
    /// Ordered, each movie at most once
    #[serde(default)]
    pub watchlist: Vec<ObjectId>,
    #[serde(default)]
    pub watched: Vec<WatchedMovie>,
    #[serde(default)]
    pub movies_watched: i64,
    #[serde(default)]
    pub movies_added: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh user; the password must already be hashed.
    pub fn new(
        name: String,
        login: String,
        password_hash: String,
        password_hint: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name,
            login,
            password_hash,
            password_hint,
            groups: Vec::new(),
            watchlist: Vec::new(),
            watched: Vec::new(),
            movies_watched: 0,
            movies_added: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply field changes in memory, mirroring the `$set` the store performs.
    pub fn apply_changes(&mut self, changes: UserChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(login) = changes.login {
            self.login = login;
        }
        if let Some(password_hash) = changes.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(password_hint) = changes.password_hint {
            self.password_hint = Some(password_hint);
        }
        self.updated_at = Utc::now();
    }
}

/// Field-level changes passed to the repository (password already hashed)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub login: Option<String>,
    pub password_hash: Option<String>,
    pub password_hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WatchedMovieResponse {
    pub movie_id: String,
    pub rating: i32,
}

/// User as returned by the API; never carries the hash or the hint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub login: String,
    pub groups: Vec<String>,
    pub watchlist: Vec<String>,
    pub watched: Vec<WatchedMovieResponse>,
    pub movies_watched: i64,
    pub movies_added: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            login: user.login,
            groups: user.groups.iter().map(|id| id.to_hex()).collect(),
            watchlist: user.watchlist.iter().map(|id| id.to_hex()).collect(),
            watched: user
                .watched
                .into_iter()
                .map(|w| WatchedMovieResponse {
                    movie_id: w.movie_id.to_hex(),
                    rating: w.rating,
                })
                .collect(),
            movies_watched: user.movies_watched,
            movies_added: user.movies_added,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// `{id, name}` reference used by group and movie views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name.clone(),
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Login is required"))]
    pub login: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub password_hint: Option<String>,
}

/// DTO for updating an existing user; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub login: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub password_hint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub login: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub login: String,
    pub password_hint: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of rating endpoints
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RatingRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
}
