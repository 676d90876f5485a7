//! HTTP handlers for the Users API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuthUser, JwtAuth, ObjectIdPath, ValidatedJson,
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{CreateUser, RatingRequest, UpdateUser, UserResponse, WatchedMovieResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        create_user,
        get_user,
        get_user_by_login,
        update_user,
        delete_user,
        add_to_watchlist,
        mark_as_watched,
    ),
    components(
        schemas(UserResponse, WatchedMovieResponse, CreateUser, UpdateUser, RatingRequest),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestObjectIdResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User directory endpoints")
    )
)]
pub struct ApiDoc;

/// Create the users router; watchlist routes act on the authenticated caller
pub fn router<R: UserRepository + ?Sized + 'static>(
    service: UserService<R>,
    auth: JwtAuth,
) -> Router {
    let shared_service = Arc::new(service);

    let protected = Router::new()
        .route("/watchlist/{movie_id}", post(add_to_watchlist))
        .route("/watched/{movie_id}", post(mark_as_watched))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/login/{login}", get(get_user_by_login))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .merge(protected)
        .with_state(shared_service)
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository + ?Sized>(
    State(service): State<Arc<UserService<R>>>,
) -> UserResult<Json<Vec<UserResponse>>> {
    let users = service.find_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository + ?Sized>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_user<R: UserRepository + ?Sized>(
    State(service): State<Arc<UserService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> UserResult<Json<UserResponse>> {
    let user = service.find_one(id).await?;
    Ok(Json(user.into()))
}

/// Get a user by login
#[utoipa::path(
    get,
    path = "/login/{login}",
    tag = "Users",
    params(("login" = String, Path, description = "User login")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_user_by_login<R: UserRepository + ?Sized>(
    State(service): State<Arc<UserService<R>>>,
    Path(login): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let user = service.find_by_login(&login).await?;
    Ok(Json(user.into()))
}

/// Update a user
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_user<R: UserRepository + ?Sized>(
    State(service): State<Arc<UserService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update(id, input).await?;
    Ok(Json(user.into()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_user<R: UserRepository + ?Sized>(
    State(service): State<Arc<UserService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> UserResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a movie to the caller's watchlist
#[utoipa::path(
    post,
    path = "/watchlist/{movie_id}",
    tag = "Users",
    params(("movie_id" = String, Path, description = "Movie ObjectId")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Watchlist updated", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn add_to_watchlist<R: UserRepository + ?Sized>(
    State(service): State<Arc<UserService<R>>>,
    caller: AuthUser,
    ObjectIdPath(movie_id): ObjectIdPath,
) -> UserResult<Json<UserResponse>> {
    let user = service.add_to_watchlist(caller.id, movie_id).await?;
    Ok(Json(user.into()))
}

/// Mark a movie as watched by the caller, with a rating
#[utoipa::path(
    post,
    path = "/watched/{movie_id}",
    tag = "Users",
    params(("movie_id" = String, Path, description = "Movie ObjectId")),
    request_body = RatingRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Movie marked as watched", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn mark_as_watched<R: UserRepository + ?Sized>(
    State(service): State<Arc<UserService<R>>>,
    caller: AuthUser,
    ObjectIdPath(movie_id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<RatingRequest>,
) -> UserResult<Json<UserResponse>> {
    let user = service
        .mark_as_watched(caller.id, movie_id, input.rating)
        .await?;
    Ok(Json(user.into()))
}
