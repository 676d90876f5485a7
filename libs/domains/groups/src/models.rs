use chrono::{DateTime, Utc};
use domain_users::{User, UserResponse, UserSummary};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Entry of a group's shared watchlist, attributed to the recommender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedMovie {
    pub movie_id: ObjectId,
    pub recommended_by: ObjectId,
}

/// Group document as stored in the `groups` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<ObjectId>,
    /// At most one entry per movie
    #[serde(default)]
    pub shared_watchlist: Vec<SharedMovie>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// A new group always starts with its creator as the only member.
    pub fn new(name: String, creator: ObjectId) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name,
            members: vec![creator],
            shared_watchlist: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_movie(&self, movie_id: &ObjectId) -> bool {
        self.shared_watchlist.iter().any(|m| &m.movie_id == movie_id)
    }

    /// Every user id referenced by the group, members first
    pub fn referenced_users(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.members
            .iter()
            .copied()
            .chain(self.shared_watchlist.iter().map(|m| m.recommended_by))
    }
}

/// DTO for creating a group; the creator comes from the session
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateGroup {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateGroup {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SharedMovieResponse {
    pub movie_id: String,
    pub recommended_by: String,
}

/// Group as stored, with ids rendered as hex strings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
    pub shared_watchlist: Vec<SharedMovieResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id.to_hex(),
            name: group.name,
            members: group.members.iter().map(|id| id.to_hex()).collect(),
            shared_watchlist: group
                .shared_watchlist
                .into_iter()
                .map(|m| SharedMovieResponse {
                    movie_id: m.movie_id.to_hex(),
                    recommended_by: m.recommended_by.to_hex(),
                })
                .collect(),
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SharedMovieView {
    pub movie_id: String,
    pub title: String,
    pub recommended_by: Option<UserSummary>,
}

/// Group with members and shared movies resolved for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupView {
    pub id: String,
    pub name: String,
    pub members: Vec<UserSummary>,
    pub shared_watchlist: Vec<SharedMovieView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `{id, name}` reference used by movie views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupSummary {
    pub id: String,
    pub name: String,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.to_hex(),
            name: group.name.clone(),
        }
    }
}

/// Outcome of the user-joins-group workflow
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub user: User,
    pub group: Group,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentResponse {
    pub user: UserResponse,
    pub group: GroupResponse,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            user: enrollment.user.into(),
            group: enrollment.group.into(),
        }
    }
}
