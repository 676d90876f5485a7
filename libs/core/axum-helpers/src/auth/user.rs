use super::jwt::JwtClaims;
use crate::errors::AppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mongodb::bson::oid::ObjectId;

/// The authenticated caller, read from the claims left by
/// [`jwt_auth_middleware`](super::jwt_auth_middleware).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: ObjectId,
    pub login: String,
}

impl TryFrom<&JwtClaims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: &JwtClaims) -> Result<Self, Self::Error> {
        let id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

        Ok(Self {
            id,
            login: claims.login.clone(),
        })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        AuthUser::try_from(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_user_from_claims() {
        let id = ObjectId::new();
        let claims = JwtClaims {
            sub: id.to_hex(),
            login: "alice".to_string(),
            iat: 0,
            exp: 0,
        };

        let user = AuthUser::try_from(&claims).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.login, "alice");
    }

    #[test]
    fn test_auth_user_rejects_non_object_id_subject() {
        let claims = JwtClaims {
            sub: "42".to_string(),
            login: "alice".to_string(),
            iat: 0,
            exp: 0,
        };

        assert!(AuthUser::try_from(&claims).is_err());
    }
}
