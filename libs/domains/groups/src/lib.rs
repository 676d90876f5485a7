//! Groups Domain
//!
//! Group registry over the MongoDB `groups` collection: membership, the
//! attributed shared watchlist, and the user-joins-group workflow.
//!
//! Member names come from [`domain_users`]; movie titles come through the
//! [`MovieTitles`] port, which the movies domain implements.

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod ports;
pub mod repository;
pub mod service;

pub use error::{GroupError, GroupResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateGroup, Enrollment, EnrollmentResponse, Group, GroupResponse, GroupSummary, GroupView,
    SharedMovie, SharedMovieView, UpdateGroup,
};
pub use mongodb::MongoGroupRepository;
pub use ports::MovieTitles;
#[cfg(any(test, feature = "testing"))]
pub use ports::StaticMovieTitles;
pub use repository::{GroupRepository, InMemoryGroupRepository};
pub use service::GroupService;
