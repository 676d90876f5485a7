use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(ObjectId),

    #[error("User with login '{0}' not found")]
    LoginNotFound(String),

    #[error("Login '{0}' is already taken")]
    DuplicateLogin(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Incorrect password hint")]
    IncorrectHint,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User with ID {} not found", id)),
            UserError::LoginNotFound(login) => {
                AppError::NotFound(format!("User with login '{}' not found", login))
            }
            UserError::DuplicateLogin(login) => {
                AppError::BadRequest(format!("Login '{}' is already taken", login))
            }
            UserError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".to_string()),
            UserError::IncorrectHint => {
                AppError::Unauthorized("Incorrect password hint".to_string())
            }
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::PasswordHash(msg) | UserError::Token(msg) => {
                tracing::error!("Credential processing failed: {}", msg);
                AppError::InternalServerError("An internal error occurred".to_string())
            }
            UserError::Database(msg) => AppError::Database(msg),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}
