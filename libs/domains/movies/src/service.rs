//! Movie Service - catalog operations and the movie-joins-group workflow

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum_helpers::parse_object_id;
use domain_groups::{GroupRepository, GroupService, GroupSummary};
use domain_users::models::{MAX_RATING, MIN_RATING};
use domain_users::{UserRepository, UserService, UserSummary};
use mongodb::bson::oid::ObjectId;
use tracing::instrument;
use validator::Validate;

use crate::error::{MovieError, MovieResult};
use crate::models::{CreateMovie, Movie, MovieDetails, Rating, RatingResponse, UpdateMovie};
use crate::repository::MovieRepository;

/// Movie service
///
/// A movie created in a group context is saved first and attached to the
/// group's shared watchlist second. The two writes are not transactional.
pub struct MovieService<R: MovieRepository + ?Sized> {
    repository: Arc<R>,
    users: UserService<dyn UserRepository>,
    groups: GroupService<dyn GroupRepository>,
}

impl<R: MovieRepository> MovieService<R> {
    pub fn new(
        repository: R,
        users: UserService<dyn UserRepository>,
        groups: GroupService<dyn GroupRepository>,
    ) -> Self {
        Self::from_arc(Arc::new(repository), users, groups)
    }
}

impl<R: MovieRepository + ?Sized> MovieService<R> {
    pub fn from_arc(
        repository: Arc<R>,
        users: UserService<dyn UserRepository>,
        groups: GroupService<dyn GroupRepository>,
    ) -> Self {
        Self {
            repository,
            users,
            groups,
        }
    }

    /// Add a movie on behalf of `creator`.
    ///
    /// When `group_id` is given the group must exist before anything is
    /// written. If attaching to the group fails afterwards, the movie stays
    /// saved and [`MovieError::DetachedFromGroup`] is returned; retry with
    /// [`attach_to_group`](Self::attach_to_group).
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateMovie, creator: ObjectId) -> MovieResult<Movie> {
        input
            .validate()
            .map_err(|e| MovieError::Validation(e.to_string()))?;

        let group_id = match input.group_id.as_deref() {
            Some(raw) => Some(parse_object_id(raw).map_err(|_| MovieError::InvalidId(raw.into()))?),
            None => None,
        };
        if let Some(group_id) = group_id {
            self.groups.get(group_id).await?;
        }

        let movie = self
            .repository
            .create(Movie::new(input, creator, group_id))
            .await?;

        let attached = match group_id {
            Some(group_id) => self
                .groups
                .recommend_movie(group_id, movie.id, creator)
                .await
                .map(|_| ())
                .map_err(|e| {
                    tracing::error!(
                        workflow = "movie_group_attach",
                        movie_id = %movie.id,
                        group_id = %group_id,
                        error = %e,
                        "Movie saved but not attached to group"
                    );
                    MovieError::DetachedFromGroup {
                        movie_id: movie.id,
                        group_id,
                        reason: e.to_string(),
                    }
                }),
            None => Ok(()),
        };

        if let Err(e) = self.users.record_movie_added(creator).await {
            tracing::warn!(user_id = %creator, error = %e, "Failed to bump movies_added");
        }

        attached.map(|_| movie)
    }

    /// All movies with `added_by` and `group` resolved
    #[instrument(skip(self))]
    pub async fn find_all(&self) -> MovieResult<Vec<MovieDetails>> {
        let movies = self.repository.find_all().await?;
        self.resolve(movies).await
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: ObjectId) -> MovieResult<MovieDetails> {
        let movie = self.get(id).await?;
        let mut details = self.resolve(vec![movie]).await?;
        details.pop().ok_or(MovieError::NotFound(id))
    }

    /// The stored movie document, unresolved
    #[instrument(skip(self))]
    pub async fn get(&self, id: ObjectId) -> MovieResult<Movie> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(MovieError::NotFound(id))
    }

    /// Movies whose owning group is `group_id`
    #[instrument(skip(self))]
    pub async fn find_by_group(&self, group_id: ObjectId) -> MovieResult<Vec<Movie>> {
        self.repository.find_by_group(group_id).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: ObjectId, input: UpdateMovie) -> MovieResult<Movie> {
        input
            .validate()
            .map_err(|e| MovieError::Validation(e.to_string()))?;

        self.repository
            .update(id, input)
            .await?
            .ok_or(MovieError::NotFound(id))
    }

    /// Delete a movie; group watchlists keep their entry
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ObjectId) -> MovieResult<()> {
        if !self.repository.delete(id).await? {
            return Err(MovieError::NotFound(id));
        }
        Ok(())
    }

    /// Repeated ratings from the same user accumulate
    #[instrument(skip(self))]
    pub async fn add_rating(
        &self,
        id: ObjectId,
        user_id: ObjectId,
        rating: i32,
    ) -> MovieResult<Movie> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(MovieError::Validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        self.repository
            .add_rating(id, Rating { user_id, rating })
            .await?
            .ok_or(MovieError::NotFound(id))
    }

    /// Point the movie at `group_id` and put it on the shared watchlist.
    /// Safe to repeat after a [`MovieError::DetachedFromGroup`].
    #[instrument(skip(self))]
    pub async fn attach_to_group(
        &self,
        id: ObjectId,
        group_id: ObjectId,
        user_id: ObjectId,
    ) -> MovieResult<Movie> {
        self.groups.get(group_id).await?;

        let movie = self
            .repository
            .set_group(id, group_id)
            .await?
            .ok_or(MovieError::NotFound(id))?;

        self.groups.recommend_movie(group_id, id, user_id).await?;
        tracing::info!(movie_id = %id, group_id = %group_id, "Movie attached to group");
        Ok(movie)
    }

    async fn resolve(&self, movies: Vec<Movie>) -> MovieResult<Vec<MovieDetails>> {
        let user_ids: HashSet<ObjectId> =
            movies.iter().flat_map(|m| m.added_by.iter().copied()).collect();
        let group_ids: HashSet<ObjectId> = movies.iter().filter_map(|m| m.group_id).collect();

        let users: HashMap<ObjectId, UserSummary> = self
            .users
            .find_many(user_ids.into_iter().collect())
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();
        let groups: HashMap<ObjectId, GroupSummary> = self
            .groups
            .find_many(group_ids.into_iter().collect())
            .await?
            .iter()
            .map(|g| (g.id, GroupSummary::from(g)))
            .collect();

        Ok(movies
            .into_iter()
            .map(|movie| MovieDetails {
                id: movie.id.to_hex(),
                average_rating: movie.average_rating(),
                ratings: movie.ratings.iter().map(RatingResponse::from).collect(),
                added_by: movie
                    .added_by
                    .iter()
                    .filter_map(|id| users.get(id).cloned())
                    .collect(),
                group: movie.group_id.and_then(|id| groups.get(&id).cloned()),
                title: movie.title,
                genre: movie.genre,
                year: movie.year,
                director: movie.director,
                added_at: movie.added_at,
                created_at: movie.created_at,
                updated_at: movie.updated_at,
            })
            .collect())
    }
}

impl<R: MovieRepository + ?Sized> Clone for MovieService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            users: self.users.clone(),
            groups: self.groups.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockMovieRepository;
    use chrono::Utc;
    use domain_groups::{
        CreateGroup, Group, GroupError, GroupResult, InMemoryGroupRepository, SharedMovie,
        StaticMovieTitles, UpdateGroup,
    };
    use domain_users::{CreateUser, InMemoryUserRepository, User};
    use mockall::predicate::*;

    struct Fixture {
        users: UserService<InMemoryUserRepository>,
        groups: GroupService<InMemoryGroupRepository>,
    }

    impl Fixture {
        fn new() -> Self {
            let users = UserService::new(InMemoryUserRepository::new());
            let groups = GroupService::new(
                InMemoryGroupRepository::new(),
                users.as_dyn(),
                Arc::new(StaticMovieTitles::new()),
            );
            Self { users, groups }
        }

        fn service(&self, repo: MockMovieRepository) -> MovieService<MockMovieRepository> {
            MovieService::new(repo, self.users.as_dyn(), self.groups.as_dyn())
        }

        async fn register(&self, login: &str) -> User {
            self.users
                .create(CreateUser {
                    name: login.to_uppercase(),
                    login: login.to_string(),
                    password: "secret1".into(),
                    password_hint: None,
                })
                .await
                .unwrap()
        }
    }

    fn dune(group_id: Option<String>) -> CreateMovie {
        CreateMovie {
            title: "Dune".into(),
            genre: "Sci-Fi".into(),
            year: Some(2021),
            director: Some("Denis Villeneuve".into()),
            added_at: Utc::now(),
            group_id,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let fixture = Fixture::new();
        let mut mock_repo = MockMovieRepository::new();
        mock_repo.expect_create().times(0);

        let mut input = dune(None);
        input.title = String::new();
        let result = fixture.service(mock_repo).create(input, ObjectId::new()).await;

        assert!(matches!(result, Err(MovieError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_in_missing_group_writes_nothing() {
        let fixture = Fixture::new();
        let mut mock_repo = MockMovieRepository::new();
        mock_repo.expect_create().times(0);

        let result = fixture
            .service(mock_repo)
            .create(dune(Some(ObjectId::new().to_hex())), ObjectId::new())
            .await;

        assert!(matches!(result, Err(MovieError::Group(GroupError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_create_with_malformed_group_id() {
        let fixture = Fixture::new();
        let mut mock_repo = MockMovieRepository::new();
        mock_repo.expect_create().times(0);

        let result = fixture
            .service(mock_repo)
            .create(dune(Some("not-an-id".into())), ObjectId::new())
            .await;

        assert!(matches!(result, Err(MovieError::InvalidId(raw)) if raw == "not-an-id"));
    }

    #[tokio::test]
    async fn test_create_attaches_and_counts() {
        let fixture = Fixture::new();
        let alice = fixture.register("alice").await;
        let group = fixture
            .groups
            .create(CreateGroup { name: "Movie Night".into() }, alice.id)
            .await
            .unwrap();
        let group_id = group.id;
        let alice_id = alice.id;

        let mut mock_repo = MockMovieRepository::new();
        mock_repo
            .expect_create()
            .withf(move |m| m.group_id == Some(group_id) && m.added_by == vec![alice_id])
            .times(1)
            .returning(Ok);

        let movie = fixture
            .service(mock_repo)
            .create(dune(Some(group.id.to_hex())), alice.id)
            .await
            .unwrap();

        let group = fixture.groups.get(group.id).await.unwrap();
        assert!(group.has_movie(&movie.id));
        assert_eq!(group.shared_watchlist[0].recommended_by, alice.id);

        let alice = fixture.users.find_one(alice.id).await.unwrap();
        assert_eq!(alice.movies_added, 1);
    }

    /// Group store whose shared-watchlist write always fails
    struct FailingAttach(InMemoryGroupRepository);

    #[async_trait::async_trait]
    impl GroupRepository for FailingAttach {
        async fn create(&self, group: Group) -> GroupResult<Group> {
            self.0.create(group).await
        }
        async fn find_all(&self) -> GroupResult<Vec<Group>> {
            self.0.find_all().await
        }
        async fn find_by_id(&self, id: ObjectId) -> GroupResult<Option<Group>> {
            self.0.find_by_id(id).await
        }
        async fn find_many(&self, ids: Vec<ObjectId>) -> GroupResult<Vec<Group>> {
            self.0.find_many(ids).await
        }
        async fn update(&self, id: ObjectId, input: UpdateGroup) -> GroupResult<Option<Group>> {
            self.0.update(id, input).await
        }
        async fn delete(&self, id: ObjectId) -> GroupResult<bool> {
            self.0.delete(id).await
        }
        async fn add_member(&self, id: ObjectId, user_id: ObjectId) -> GroupResult<Option<Group>> {
            self.0.add_member(id, user_id).await
        }
        async fn add_movie(&self, _id: ObjectId, _entry: SharedMovie) -> GroupResult<Option<Group>> {
            Err(GroupError::Database("write concern timeout".into()))
        }
    }

    #[tokio::test]
    async fn test_create_reports_detached_movie() {
        let fixture = Fixture::new();
        let alice = fixture.register("alice").await;
        let group_repo = InMemoryGroupRepository::new();
        let group = group_repo
            .create(Group::new("Movie Night".into(), alice.id))
            .await
            .unwrap();
        let groups = GroupService::new(
            FailingAttach(group_repo),
            fixture.users.as_dyn(),
            Arc::new(StaticMovieTitles::new()),
        );

        let mut mock_repo = MockMovieRepository::new();
        mock_repo.expect_create().times(1).returning(Ok);

        let result = MovieService::new(mock_repo, fixture.users.as_dyn(), groups.as_dyn())
            .create(dune(Some(group.id.to_hex())), alice.id)
            .await;

        match result {
            Err(MovieError::DetachedFromGroup { group_id, reason, .. }) => {
                assert_eq!(group_id, group.id);
                assert!(reason.contains("write concern timeout"));
            }
            other => panic!("expected DetachedFromGroup, got {:?}", other),
        }

        // The creator is still credited for the saved movie
        let alice = fixture.users.find_one(alice.id).await.unwrap();
        assert_eq!(alice.movies_added, 1);
    }

    #[tokio::test]
    async fn test_add_rating_out_of_range() {
        let fixture = Fixture::new();
        let mut mock_repo = MockMovieRepository::new();
        mock_repo.expect_add_rating().times(0);

        let service = fixture.service(mock_repo);
        for rating in [0, 6] {
            let result = service.add_rating(ObjectId::new(), ObjectId::new(), rating).await;
            assert!(matches!(result, Err(MovieError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_add_rating_missing_movie() {
        let fixture = Fixture::new();
        let id = ObjectId::new();
        let mut mock_repo = MockMovieRepository::new();
        mock_repo
            .expect_add_rating()
            .with(eq(id), always())
            .times(1)
            .returning(|_, _| Ok(None));

        let result = fixture
            .service(mock_repo)
            .add_rating(id, ObjectId::new(), 4)
            .await;
        assert!(matches!(result, Err(MovieError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_movie() {
        let fixture = Fixture::new();
        let mut mock_repo = MockMovieRepository::new();
        mock_repo.expect_update().returning(|_, _| Ok(None));
        mock_repo.expect_delete().returning(|_| Ok(false));

        let service = fixture.service(mock_repo);
        assert!(matches!(
            service.update(ObjectId::new(), UpdateMovie::default()).await,
            Err(MovieError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(ObjectId::new()).await,
            Err(MovieError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_one_resolves_references() {
        let fixture = Fixture::new();
        let alice = fixture.register("alice").await;
        let group = fixture
            .groups
            .create(CreateGroup { name: "Movie Night".into() }, alice.id)
            .await
            .unwrap();
        let mut movie = Movie::new(dune(None), alice.id, Some(group.id));
        movie.added_by.push(ObjectId::new());

        let mut mock_repo = MockMovieRepository::new();
        let stored = movie.clone();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let details = fixture.service(mock_repo).find_one(movie.id).await.unwrap();

        assert_eq!(details.added_by, vec![UserSummary::from(&alice)]);
        assert_eq!(details.group, Some(GroupSummary::from(&group)));
        assert_eq!(details.average_rating, None);
    }
}
