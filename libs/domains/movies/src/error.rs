use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_groups::GroupError;
use domain_users::UserError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MovieError {
    #[error("Movie not found: {0}")]
    NotFound(ObjectId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid ObjectId: {0}")]
    InvalidId(String),

    /// The movie exists but is missing from the group's shared watchlist
    #[error("Movie {movie_id} was saved but not attached to group {group_id}: {reason}")]
    DetachedFromGroup {
        movie_id: ObjectId,
        group_id: ObjectId,
        reason: String,
    },

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type MovieResult<T> = Result<T, MovieError>;

impl From<MovieError> for AppError {
    fn from(err: MovieError) -> Self {
        match err {
            MovieError::NotFound(id) => {
                AppError::NotFound(format!("Movie with ID {} not found", id))
            }
            MovieError::Validation(msg) => AppError::BadRequest(msg),
            MovieError::InvalidId(raw) => {
                AppError::InvalidObjectId(format!("'{}' is not a valid ObjectId", raw))
            }
            MovieError::DetachedFromGroup {
                movie_id, group_id, ..
            } => AppError::InternalServerError(format!(
                "Movie {} was saved but could not be attached to group {}; retry the attach",
                movie_id, group_id
            )),
            MovieError::Group(e) => e.into(),
            MovieError::User(e) => e.into(),
            MovieError::Database(msg) => AppError::Database(msg),
            MovieError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for MovieError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for MovieError {
    fn from(err: mongodb::error::Error) -> Self {
        MovieError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_codes() {
        let cases = [
            (MovieError::NotFound(ObjectId::new()), StatusCode::NOT_FOUND),
            (MovieError::Validation("title".into()), StatusCode::BAD_REQUEST),
            (MovieError::InvalidId("xyz".into()), StatusCode::BAD_REQUEST),
            (
                MovieError::Group(GroupError::NotFound(ObjectId::new())),
                StatusCode::NOT_FOUND,
            ),
            (
                MovieError::DetachedFromGroup {
                    movie_id: ObjectId::new(),
                    group_id: ObjectId::new(),
                    reason: "timeout".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
