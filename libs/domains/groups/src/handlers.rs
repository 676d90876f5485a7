//! HTTP handlers for the Groups API

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
use domain_users::{CreateUser, UserResponse, UserSummary};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::GroupResult;
use crate::models::{
    CreateGroup, EnrollmentResponse, GroupResponse, GroupView, SharedMovieResponse,
    SharedMovieView, UpdateGroup,
};
use crate::repository::GroupRepository;
use crate::service::GroupService;

/// OpenAPI documentation for Groups API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_groups,
        create_group,
        get_group,
        update_group,
        delete_group,
        add_member,
        recommend_movie,
        enroll_member,
    ),
    components(
        schemas(
            GroupView, GroupResponse, SharedMovieView, SharedMovieResponse, CreateGroup,
            UpdateGroup, EnrollmentResponse, UserSummary, UserResponse, CreateUser
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
        (name = "Groups", description = "Group registry endpoints")
    )
)]
pub struct ApiDoc;

pub fn router<R: GroupRepository + ?Sized + 'static>(
    service: GroupService<R>,
    auth: JwtAuth,
) -> Router {
    let shared_service = Arc::new(service);

    let protected = Router::new()
        .route("/", post(create_group))
        .route("/{id}/movies/{movie_id}", post(recommend_movie))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));

    Router::new()
        .route("/", get(list_groups))
        .route(
            "/{id}",
            get(get_group).patch(update_group).delete(delete_group),
        )
        .route("/{id}/members/{user_id}", post(add_member))
        .route("/{id}/enroll", post(enroll_member))
        .merge(protected)
        .with_state(shared_service)
}

/// List all groups with members and movies resolved
#[utoipa::path(
    get,
    path = "",
    tag = "Groups",
    responses(
        (status = 200, description = "List of groups", body = Vec<GroupView>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_groups<R: GroupRepository + ?Sized>(
    State(service): State<Arc<GroupService<R>>>,
) -> GroupResult<Json<Vec<GroupView>>> {
    Ok(Json(service.find_all().await?))
}

/// Create a group with the caller as its first member
#[utoipa::path(
    post,
    path = "",
    tag = "Groups",
    request_body = CreateGroup,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn create_group<R: GroupRepository + ?Sized>(
    State(service): State<Arc<GroupService<R>>>,
    caller: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateGroup>,
) -> GroupResult<impl IntoResponse> {
    let group = service.create(input, caller.id).await?;
    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

/// Get a group with members and movies resolved
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Groups",
    params(("id" = String, Path, description = "Group ObjectId")),
    responses(
        (status = 200, description = "Group found", body = GroupView),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_group<R: GroupRepository + ?Sized>(
    State(service): State<Arc<GroupService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> GroupResult<Json<GroupView>> {
    Ok(Json(service.find_one(id).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Groups",
    params(("id" = String, Path, description = "Group ObjectId")),
    request_body = UpdateGroup,
    responses(
        (status = 200, description = "Group updated", body = GroupResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_group<R: GroupRepository + ?Sized>(
    State(service): State<Arc<GroupService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<UpdateGroup>,
) -> GroupResult<Json<GroupResponse>> {
    let group = service.update(id, input).await?;
    Ok(Json(group.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Groups",
    params(("id" = String, Path, description = "Group ObjectId")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_group<R: GroupRepository + ?Sized>(
    State(service): State<Arc<GroupService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> GroupResult<impl IntoResponse> {
    service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add an existing user to a group
#[utoipa::path(
    post,
    path = "/{id}/members/{user_id}",
    tag = "Groups",
    params(
        ("id" = String, Path, description = "Group ObjectId"),
        ("user_id" = String, Path, description = "User ObjectId")
    ),
    responses(
        (status = 200, description = "Member added", body = GroupResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn add_member<R: GroupRepository + ?Sized>(
    State(service): State<Arc<GroupService<R>>>,
    ObjectIdPairPath(group_id, user_id): ObjectIdPairPath,
) -> GroupResult<Json<GroupResponse>> {
    let group = service.add_member(group_id, user_id).await?;
    Ok(Json(group.into()))
}

/// Recommend a movie to the group on behalf of the caller
#[utoipa::path(
    post,
    path = "/{id}/movies/{movie_id}",
    tag = "Groups",
    params(
        ("id" = String, Path, description = "Group ObjectId"),
        ("movie_id" = String, Path, description = "Movie ObjectId")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Movie on the shared watchlist", body = GroupResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn recommend_movie<R: GroupRepository + ?Sized>(
    State(service): State<Arc<GroupService<R>>>,
    caller: AuthUser,
    ObjectIdPairPath(group_id, movie_id): ObjectIdPairPath,
) -> GroupResult<Json<GroupResponse>> {
    let group = service.recommend_movie(group_id, movie_id, caller.id).await?;
    Ok(Json(group.into()))
}

/// Register a new user directly into a group
#[utoipa::path(
    post,
    path = "/{id}/enroll",
    tag = "Groups",
    params(("id" = String, Path, description = "Group ObjectId")),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created and added", body = EnrollmentResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn enroll_member<R: GroupRepository + ?Sized>(
    State(service): State<Arc<GroupService<R>>>,
    ObjectIdPath(group_id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> GroupResult<impl IntoResponse> {
    let enrollment = service.enroll_new_member(group_id, input).await?;
    Ok((StatusCode::CREATED, Json(EnrollmentResponse::from(enrollment))))
}
