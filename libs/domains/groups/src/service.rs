//! Group Service - registry operations and the user-joins-group workflow

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use domain_users::{CreateUser, UserRepository, UserService, UserSummary};
use mongodb::bson::oid::ObjectId;
use tracing::instrument;
use validator::Validate;

use crate::error::{GroupError, GroupResult};
use crate::models::{
    CreateGroup, Enrollment, Group, GroupView, SharedMovie, SharedMovieView, UpdateGroup,
};
use crate::ports::MovieTitles;
use crate::repository::GroupRepository;

/// Group service
///
/// Membership lives on the group document; the user's `groups` list is a
/// back-reference written after it, best effort.
pub struct GroupService<R: GroupRepository + ?Sized> {
    repository: Arc<R>,
    users: UserService<dyn UserRepository>,
    titles: Arc<dyn MovieTitles>,
}

impl<R: GroupRepository> GroupService<R> {
    pub fn new(
        repository: R,
        users: UserService<dyn UserRepository>,
        titles: Arc<dyn MovieTitles>,
    ) -> Self {
        Self::from_arc(Arc::new(repository), users, titles)
    }
}

impl<R: GroupRepository + 'static> GroupService<R> {
    /// Type-erased handle sharing the same repository and collaborators
    pub fn as_dyn(&self) -> GroupService<dyn GroupRepository> {
        let repository: Arc<dyn GroupRepository> = self.repository.clone();
        GroupService {
            repository,
            users: self.users.clone(),
            titles: Arc::clone(&self.titles),
        }
    }
}

impl<R: GroupRepository + ?Sized> GroupService<R> {
    pub fn from_arc(
        repository: Arc<R>,
        users: UserService<dyn UserRepository>,
        titles: Arc<dyn MovieTitles>,
    ) -> Self {
        Self {
            repository,
            users,
            titles,
        }
    }

    /// Create a group with `creator` as its first member
    #[instrument(skip(self, input), fields(group_name = %input.name))]
    pub async fn create(&self, input: CreateGroup, creator: ObjectId) -> GroupResult<Group> {
        input
            .validate()
            .map_err(|e| GroupError::Validation(e.to_string()))?;

        self.users.find_one(creator).await?;

        let group = self
            .repository
            .create(Group::new(input.name, creator))
            .await?;

        self.link_member(creator, group.id).await;
        Ok(group)
    }

    /// All groups with members and shared movies resolved
    #[instrument(skip(self))]
    pub async fn find_all(&self) -> GroupResult<Vec<GroupView>> {
        let groups = self.repository.find_all().await?;
        self.resolve(groups).await
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: ObjectId) -> GroupResult<GroupView> {
        let group = self.get(id).await?;
        let mut views = self.resolve(vec![group]).await?;
        views.pop().ok_or(GroupError::NotFound(id))
    }

    /// The stored group document, unresolved
    #[instrument(skip(self))]
    pub async fn get(&self, id: ObjectId) -> GroupResult<Group> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(GroupError::NotFound(id))
    }

    /// Groups for the given ids; unknown ids are skipped
    #[instrument(skip(self, ids))]
    pub async fn find_many(&self, ids: Vec<ObjectId>) -> GroupResult<Vec<Group>> {
        self.repository.find_many(ids).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: ObjectId, input: UpdateGroup) -> GroupResult<Group> {
        input
            .validate()
            .map_err(|e| GroupError::Validation(e.to_string()))?;

        self.repository
            .update(id, input)
            .await?
            .ok_or(GroupError::NotFound(id))
    }

    /// Delete a group; members' back-references are left in place
    #[instrument(skip(self))]
    pub async fn remove(&self, id: ObjectId) -> GroupResult<()> {
        if !self.repository.delete(id).await? {
            return Err(GroupError::NotFound(id));
        }
        Ok(())
    }

    /// Idempotent; both the group and the user must exist
    #[instrument(skip(self))]
    pub async fn add_member(&self, group_id: ObjectId, user_id: ObjectId) -> GroupResult<Group> {
        self.get(group_id).await?;
        self.users.find_one(user_id).await?;

        let group = self
            .repository
            .add_member(group_id, user_id)
            .await?
            .ok_or(GroupError::NotFound(group_id))?;

        self.link_member(user_id, group_id).await;
        Ok(group)
    }

    /// Put a movie on the shared watchlist. A movie already present keeps
    /// its original recommender.
    #[instrument(skip(self))]
    pub async fn recommend_movie(
        &self,
        group_id: ObjectId,
        movie_id: ObjectId,
        recommended_by: ObjectId,
    ) -> GroupResult<Group> {
        self.repository
            .add_movie(
                group_id,
                SharedMovie {
                    movie_id,
                    recommended_by,
                },
            )
            .await?
            .ok_or(GroupError::NotFound(group_id))
    }

    /// Register a user and add them to the group.
    ///
    /// Not transactional: if adding the member fails, the new user stays in
    /// place and [`GroupError::EnrollmentIncomplete`] is returned so the
    /// caller can retry `add_member`.
    #[instrument(skip(self, input), fields(login = %input.login))]
    pub async fn enroll_new_member(
        &self,
        group_id: ObjectId,
        input: CreateUser,
    ) -> GroupResult<Enrollment> {
        self.get(group_id).await?;

        let user = self.users.create(input).await?;

        match self.add_member(group_id, user.id).await {
            Ok(group) => {
                tracing::info!(user_id = %user.id, group_id = %group_id, "User enrolled in group");
                // Pick up the back-reference written by add_member
                let user = self.users.find_one(user.id).await.unwrap_or(user);
                Ok(Enrollment { user, group })
            }
            Err(e) => {
                tracing::error!(
                    workflow = "group_enrollment",
                    user_id = %user.id,
                    group_id = %group_id,
                    error = %e,
                    "User created but not added to group"
                );
                Err(GroupError::EnrollmentIncomplete {
                    user_id: user.id,
                    group_id,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn link_member(&self, user_id: ObjectId, group_id: ObjectId) {
        if let Err(e) = self.users.join_group(user_id, group_id).await {
            tracing::error!(
                workflow = "member_backref",
                user_id = %user_id,
                group_id = %group_id,
                error = %e,
                "Group membership stored but user back-reference failed"
            );
        }
    }

    /// Resolve member and recommender names plus movie titles with one
    /// lookup each. Unknown users and movies are skipped.
    async fn resolve(&self, groups: Vec<Group>) -> GroupResult<Vec<GroupView>> {
        let user_ids: HashSet<ObjectId> = groups.iter().flat_map(Group::referenced_users).collect();
        let movie_ids: HashSet<ObjectId> = groups
            .iter()
            .flat_map(|g| g.shared_watchlist.iter().map(|m| m.movie_id))
            .collect();

        let users: HashMap<ObjectId, UserSummary> = self
            .users
            .find_many(user_ids.into_iter().collect())
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();
        let titles = self.titles.titles(movie_ids.into_iter().collect()).await?;

        Ok(groups
            .into_iter()
            .map(|group| GroupView {
                id: group.id.to_hex(),
                name: group.name,
                members: group
                    .members
                    .iter()
                    .filter_map(|id| users.get(id).cloned())
                    .collect(),
                shared_watchlist: group
                    .shared_watchlist
                    .iter()
                    .filter_map(|entry| {
                        titles.get(&entry.movie_id).map(|title| SharedMovieView {
                            movie_id: entry.movie_id.to_hex(),
                            title: title.clone(),
                            recommended_by: users.get(&entry.recommended_by).cloned(),
                        })
                    })
                    .collect(),
                created_at: group.created_at,
                updated_at: group.updated_at,
            })
            .collect())
    }
}

impl<R: GroupRepository + ?Sized> Clone for GroupService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            users: self.users.clone(),
            titles: Arc::clone(&self.titles),
        }
    }
}
