//! Application state management.
//!
//! One service per domain, each over its MongoDB repository. Services hold
//! `Arc`s, so cloning the state is cheap.

use std::sync::Arc;

use axum_helpers::JwtAuth;
use domain_groups::{GroupRepository, GroupService, MongoGroupRepository};
use domain_movies::{MongoMovieRepository, MovieRepository, MovieService, MovieTitleLookup};
use domain_users::{MongoUserRepository, UserRepository, UserService};
use mongodb::{Client, Database};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    pub jwt: JwtAuth,
    pub users: UserService<dyn UserRepository>,
    pub groups: GroupService<dyn GroupRepository>,
    pub movies: MovieService<dyn MovieRepository>,
}

impl AppState {
    /// Create the indexes and wire the domain services.
    ///
    /// Groups read movie titles through the movie repository and movies
    /// write to groups through the group service, so both share handles.
    pub async fn new(
        config: crate::config::Config,
        mongo_client: Client,
        db: Database,
    ) -> eyre::Result<Self> {
        let user_repo = MongoUserRepository::new(&db);
        let group_repo = MongoGroupRepository::new(&db);
        let movie_repo = MongoMovieRepository::new(&db);

        user_repo.init_indexes().await?;
        group_repo.init_indexes().await?;
        movie_repo.init_indexes().await?;

        let movie_repo: Arc<dyn MovieRepository> = Arc::new(movie_repo);

        let users = UserService::new(user_repo).as_dyn();
        let titles = Arc::new(MovieTitleLookup::new(movie_repo.clone()));
        let groups = GroupService::new(group_repo, users.clone(), titles).as_dyn();
        let movies = MovieService::from_arc(movie_repo, users.clone(), groups.clone());

        let jwt = JwtAuth::new(&config.jwt);

        Ok(Self {
            config,
            mongo_client,
            jwt,
            users,
            groups,
            movies,
        })
    }
}
