//! OpenAPI documentation configuration

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Movie Night API",
        version = "0.1.0",
        description = "Users, groups and movies for shared movie nights",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/users", api = domain_users::ApiDoc),
        (path = "/api/auth", api = domain_users::AuthApiDoc),
        (path = "/api/groups", api = domain_groups::ApiDoc),
        (path = "/api/movies", api = domain_movies::ApiDoc)
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Users", description = "User directory and watchlists"),
        (name = "Auth", description = "Login and password reset"),
        (name = "Groups", description = "Groups and their shared watchlists"),
        (name = "Movies", description = "Movie catalog and ratings")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
