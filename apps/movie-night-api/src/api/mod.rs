//! API routes module
//!
//! Every domain router is nested under /api by axum_helpers::create_router.

pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest(
            "/users",
            domain_users::handlers::router(state.users.clone(), state.jwt.clone()),
        )
        .nest(
            "/auth",
            domain_users::auth_handlers::router(state.users.clone(), state.jwt.clone()),
        )
        .nest(
            "/groups",
            domain_groups::handlers::router(state.groups.clone(), state.jwt.clone()),
        )
        .nest(
            "/movies",
            domain_movies::handlers::router(state.movies.clone(), state.jwt.clone()),
        )
        .merge(health::router(state.clone()))
}
