use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_users::UserError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("Group not found: {0}")]
    NotFound(ObjectId),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// The user was created but could not be added to the group
    #[error("User {user_id} was created but not added to group {group_id}: {reason}")]
    EnrollmentIncomplete {
        user_id: ObjectId,
        group_id: ObjectId,
        reason: String,
    },

    #[error(transparent)]
    User(#[from] UserError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type GroupResult<T> = Result<T, GroupError>;

impl From<GroupError> for AppError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::NotFound(id) => {
                AppError::NotFound(format!("Group with ID {} not found", id))
            }
            GroupError::Validation(msg) => AppError::BadRequest(msg),
            GroupError::EnrollmentIncomplete {
                user_id, group_id, ..
            } => AppError::InternalServerError(format!(
                "User {} was created but could not be added to group {}; retry adding the member",
                user_id, group_id
            )),
            GroupError::User(e) => e.into(),
            GroupError::Database(msg) => AppError::Database(msg),
            GroupError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for GroupError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for GroupError {
    fn from(err: mongodb::error::Error) -> Self {
        GroupError::Database(err.to_string())
    }
}
