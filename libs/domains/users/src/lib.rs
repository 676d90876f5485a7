//! Users Domain
//!
//! User directory, credential store and the authentication workflow,
//! persisted in the MongoDB `users` collection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐
//! │ Handlers / AuthHandlers │  ← HTTP endpoints (`/users`, `/auth`)
//! └───────────┬─────────────┘
//!             │
//! ┌───────────▼─────────────┐
//! │       UserService       │  ← Validation, hashing, hint check
//! └───────────┬─────────────┘
//!             │
//! ┌───────────▼─────────────┐
//! │     UserRepository      │  ← Trait + MongoDB / in-memory implementations
//! └─────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{MongoUserRepository, UserService, auth_handlers, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("movie_night");
//!
//! let repository = MongoUserRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = UserService::new(repository);
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("0123456789abcdef0123456789abcdef")?);
//! let users = handlers::router(service.clone(), jwt.clone());
//! let auth = auth_handlers::router(service, jwt);
//! # Ok(())
//! # }
//! ```

pub mod auth_handlers;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use auth_handlers::{AuthApiDoc, AuthState, issue_session};
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateUser, LoginRequest, LoginResponse, MessageResponse, RatingRequest,
    ResetPasswordRequest, UpdateUser, User, UserChanges, UserResponse, UserSummary,
    WatchedMovie,
};
pub use mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
