//! Authentication endpoints: login, password reset and the current caller.

use axum::{
    Json, Router,
    extract::State,
    http::header,
    middleware,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use axum_helpers::{
    AuthUser, JwtAuth, ValidatedJson,
    auth::middleware::ACCESS_TOKEN_COOKIE,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, ResetPasswordRequest, User, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const PASSWORD_RESET_MESSAGE: &str = "Password successfully reset";

/// OpenAPI documentation for Auth API
#[derive(OpenApi)]
#[openapi(
    paths(login, reset_password, me),
    components(
        schemas(LoginRequest, LoginResponse, ResetPasswordRequest, MessageResponse),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Login and password reset")
    )
)]
pub struct AuthApiDoc;

/// Application state for auth handlers
pub struct AuthState<R: UserRepository + ?Sized> {
    pub service: UserService<R>,
    pub jwt: JwtAuth,
}

impl<R: UserRepository + ?Sized> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            jwt: self.jwt.clone(),
        }
    }
}

pub fn router<R: UserRepository + ?Sized + 'static>(
    service: UserService<R>,
    jwt: JwtAuth,
) -> Router {
    let state = AuthState {
        service,
        jwt: jwt.clone(),
    };

    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware));

    Router::new()
        .route("/login", post(login))
        .route("/reset-password", post(reset_password))
        .merge(protected)
        .with_state(state)
}

/// Sign an access token for an authenticated user
pub fn issue_session(jwt: &JwtAuth, user: &User) -> UserResult<LoginResponse> {
    let access_token = jwt
        .create_token(&user.id, &user.login)
        .map_err(|e| UserError::Token(e.to_string()))?;

    Ok(LoginResponse { access_token })
}

/// Exchange login and password for an access token
///
/// The token is also set as an HttpOnly `access_token` cookie.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn login<R: UserRepository + ?Sized>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<impl IntoResponse> {
    let user = state
        .service
        .validate_credential(&input.login, &input.password)
        .await?
        .ok_or(UserError::InvalidCredentials)?;

    let session = issue_session(&state.jwt, &user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        ACCESS_TOKEN_COOKIE,
        session.access_token,
        state.jwt.ttl_secs()
    );

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(session)))
}

/// Reset a password by answering the stored hint
#[utoipa::path(
    post,
    path = "/reset-password",
    tag = "Auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn reset_password<R: UserRepository + ?Sized>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> UserResult<Json<MessageResponse>> {
    state
        .service
        .reset_credential(&input.login, &input.password_hint, &input.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: PASSWORD_RESET_MESSAGE.to_string(),
    }))
}

/// The authenticated caller
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn me<R: UserRepository + ?Sized>(
    State(state): State<AuthState<R>>,
    caller: AuthUser,
) -> UserResult<Json<UserResponse>> {
    let user = state.service.find_one(caller.id).await?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::JwtConfig;

    #[test]
    fn test_issue_session_token_carries_user() {
        let jwt = JwtAuth::new(
            &JwtConfig::new("0123456789abcdef0123456789abcdef").unwrap(),
        );
        let user = User::new("Alice".into(), "alice".into(), "hash".into(), None);

        let session = issue_session(&jwt, &user).unwrap();
        let claims = jwt.verify_token(&session.access_token).unwrap();

        assert_eq!(claims.sub, user.id.to_hex());
        assert_eq!(claims.login, "alice");
        assert_eq!(claims.exp - claims.iat, jwt.ttl_secs());
    }
}
