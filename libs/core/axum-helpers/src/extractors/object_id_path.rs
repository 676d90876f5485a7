use crate::errors::AppError;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use mongodb::bson::oid::ObjectId;

/// Single `{id}` path segment parsed as an [`ObjectId`].
///
/// Malformed ids are rejected with 400 `INVALID_OBJECT_ID` before the
/// handler runs.
///
/// ```ignore
/// async fn get_movie(ObjectIdPath(id): ObjectIdPath) -> String {
///     id.to_hex()
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ObjectIdPath(pub ObjectId);

impl<S> FromRequestParts<S> for ObjectIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        parse_object_id(&raw).map(ObjectIdPath)
    }
}

/// Two path segments, e.g. `/groups/{id}/members/{user_id}`.
#[derive(Debug, Clone, Copy)]
pub struct ObjectIdPairPath(pub ObjectId, pub ObjectId);

impl<S> FromRequestParts<S> for ObjectIdPairPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((first, second)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        Ok(ObjectIdPairPath(
            parse_object_id(&first)?,
            parse_object_id(&second)?,
        ))
    }
}

/// Parse a 24-character hex string, mapping failures to `InvalidObjectId`.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw)
        .map_err(|_| AppError::InvalidObjectId(format!("'{}' is not a valid ObjectId", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn one(ObjectIdPath(id): ObjectIdPath) -> String {
        id.to_hex()
    }

    async fn two(ObjectIdPairPath(a, b): ObjectIdPairPath) -> String {
        format!("{}:{}", a.to_hex(), b.to_hex())
    }

    fn app() -> Router {
        Router::new()
            .route("/things/{id}", get(one))
            .route("/things/{id}/others/{other_id}", get(two))
    }

    async fn call(uri: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_object_id_is_extracted() {
        let id = ObjectId::new();
        let (status, body) = call(&format!("/things/{}", id.to_hex())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, id.to_hex());
    }

    #[tokio::test]
    async fn test_malformed_object_id_is_rejected() {
        let (status, body) = call("/things/not-an-id").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("INVALID_OBJECT_ID"));
    }

    #[tokio::test]
    async fn test_pair_rejects_when_second_is_malformed() {
        let id = ObjectId::new();
        let (status, _) = call(&format!("/things/{}/others/xyz", id.to_hex())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pair_extracts_both() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let (status, body) = call(&format!("/things/{}/others/{}", a, b)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{}:{}", a.to_hex(), b.to_hex()));
    }

    #[test]
    fn test_parse_object_id() {
        assert!(parse_object_id("507f1f77bcf86cd799439011").is_ok());
        assert!(parse_object_id("507f1f77").is_err());
    }
}
