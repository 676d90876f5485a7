//! HTTP handlers for the Movies API

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuthUser, JwtAuth, ObjectIdPairPath, ObjectIdPath, ValidatedJson,
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use domain_groups::GroupSummary;
use domain_users::{RatingRequest, UserSummary};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::MovieResult;
use crate::models::{CreateMovie, MovieDetails, MovieResponse, RatingResponse, UpdateMovie};
use crate::repository::MovieRepository;
use crate::service::MovieService;

/// OpenAPI documentation for Movies API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_movies,
        create_movie,
        get_movie,
        update_movie,
        delete_movie,
        list_group_movies,
        rate_movie,
        attach_to_group,
    ),
    components(
        schemas(
            MovieDetails, MovieResponse, RatingResponse, CreateMovie, UpdateMovie,
            RatingRequest, UserSummary, GroupSummary
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestObjectIdResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Movies", description = "Movie catalog endpoints")
    )
)]
pub struct ApiDoc;

pub fn router<R: MovieRepository + ?Sized + 'static>(
    service: MovieService<R>,
    auth: JwtAuth,
) -> Router {
    let shared_service = Arc::new(service);

    let protected = Router::new()
        .route("/", post(create_movie))
        .route("/{id}/ratings", post(rate_movie))
        .route("/{id}/group/{group_id}", post(attach_to_group))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));

    Router::new()
        .route("/", get(list_movies))
        .route(
            "/{id}",
            get(get_movie).patch(update_movie).delete(delete_movie),
        )
        .route("/group/{group_id}", get(list_group_movies))
        .merge(protected)
        .with_state(shared_service)
}

/// List all movies with contributors and group resolved
#[utoipa::path(
    get,
    path = "",
    tag = "Movies",
    responses(
        (status = 200, description = "List of movies", body = Vec<MovieDetails>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_movies<R: MovieRepository + ?Sized>(
    State(service): State<Arc<MovieService<R>>>,
) -> MovieResult<Json<Vec<MovieDetails>>> {
    Ok(Json(service.find_all().await?))
}

/// Add a movie, optionally straight onto a group's shared watchlist
#[utoipa::path(
    post,
    path = "",
    tag = "Movies",
    request_body = CreateMovie,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Movie created", body = MovieResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_movie<R: MovieRepository + ?Sized>(
    State(service): State<Arc<MovieService<R>>>,
    caller: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateMovie>,
) -> MovieResult<impl IntoResponse> {
    let movie = service.create(input, caller.id).await?;
    Ok((StatusCode::CREATED, Json(MovieResponse::from(movie))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Movies",
    params(("id" = String, Path, description = "Movie ObjectId")),
    responses(
        (status = 200, description = "Movie found", body = MovieDetails),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_movie<R: MovieRepository + ?Sized>(
    State(service): State<Arc<MovieService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> MovieResult<Json<MovieDetails>> {
    Ok(Json(service.find_one(id).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Movies",
    params(("id" = String, Path, description = "Movie ObjectId")),
    request_body = UpdateMovie,
    responses(
        (status = 200, description = "Movie updated", body = MovieResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_movie<R: MovieRepository + ?Sized>(
    State(service): State<Arc<MovieService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<UpdateMovie>,
) -> MovieResult<Json<MovieResponse>> {
    let movie = service.update(id, input).await?;
    Ok(Json(movie.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Movies",
    params(("id" = String, Path, description = "Movie ObjectId")),
    responses(
        (status = 204, description = "Movie deleted"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_movie<R: MovieRepository + ?Sized>(
    State(service): State<Arc<MovieService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> MovieResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Movies owned by a group
#[utoipa::path(
    get,
    path = "/group/{group_id}",
    tag = "Movies",
    params(("group_id" = String, Path, description = "Group ObjectId")),
    responses(
        (status = 200, description = "Movies of the group", body = Vec<MovieResponse>),
        (status = 400, response = BadRequestObjectIdResponse)
    )
)]
async fn list_group_movies<R: MovieRepository + ?Sized>(
    State(service): State<Arc<MovieService<R>>>,
    ObjectIdPath(group_id): ObjectIdPath,
) -> MovieResult<Json<Vec<MovieResponse>>> {
    let movies = service.find_by_group(group_id).await?;
    Ok(Json(movies.into_iter().map(MovieResponse::from).collect()))
}

/// Rate a movie as the caller
#[utoipa::path(
    post,
    path = "/{id}/ratings",
    tag = "Movies",
    params(("id" = String, Path, description = "Movie ObjectId")),
    request_body = RatingRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rating recorded", body = MovieResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn rate_movie<R: MovieRepository + ?Sized>(
    State(service): State<Arc<MovieService<R>>>,
    caller: AuthUser,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<RatingRequest>,
) -> MovieResult<Json<MovieResponse>> {
    let movie = service.add_rating(id, caller.id, input.rating).await?;
    Ok(Json(movie.into()))
}

/// Attach a movie to a group, e.g. after a failed attach on create
#[utoipa::path(
    post,
    path = "/{id}/group/{group_id}",
    tag = "Movies",
    params(
        ("id" = String, Path, description = "Movie ObjectId"),
        ("group_id" = String, Path, description = "Group ObjectId")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Movie attached", body = MovieResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn attach_to_group<R: MovieRepository + ?Sized>(
    State(service): State<Arc<MovieService<R>>>,
    caller: AuthUser,
    ObjectIdPairPath(id, group_id): ObjectIdPairPath,
) -> MovieResult<Json<MovieResponse>> {
    let movie = service.attach_to_group(id, group_id, caller.id).await?;
    Ok(Json(movie.into()))
}
