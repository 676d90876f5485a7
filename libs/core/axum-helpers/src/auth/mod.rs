//! Stateless JWT authentication.
//!
//! - [`JwtConfig`]: signing secret and token lifetime from the environment
//! - [`JwtAuth`]: HS256 token issuing and verification
//! - [`jwt_auth_middleware`]: rejects requests without a valid token and
//!   stores the [`JwtClaims`] in the request extensions
//! - [`AuthUser`]: extractor for the authenticated caller
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/me", get(handler))
//!     .route_layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod user;

pub use config::{DEFAULT_TOKEN_TTL_SECS, JwtConfig};
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
pub use user::AuthUser;
