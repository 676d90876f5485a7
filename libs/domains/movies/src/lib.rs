//! Movies Domain
//!
//! Movie catalog over the MongoDB `movies` collection, with ratings and the
//! movie-joins-group workflow.
//!
//! ```text
//! handlers ──> MovieService ──> MovieRepository (Mongo / in-memory)
//!                  │
//!                  ├──> UserService   (added_by names, movies_added counter)
//!                  └──> GroupService  (group lookup, shared watchlist)
//! ```
//!
//! [`MovieTitleLookup`] closes the loop back to the groups domain, which
//! shows movie titles on its resolved views.

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;
pub mod titles;

pub use error::{MovieError, MovieResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateMovie, Movie, MovieDetails, MovieResponse, Rating, RatingResponse, UpdateMovie,
};
pub use mongodb::MongoMovieRepository;
pub use repository::{InMemoryMovieRepository, MovieRepository};
pub use service::MovieService;
pub use titles::MovieTitleLookup;
