use chrono::{DateTime, Utc};
use domain_groups::GroupSummary;
use domain_users::UserSummary;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A single user's rating; the same user may rate a movie more than once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: ObjectId,
    pub rating: i32,
}

/// Movie document as stored in the `movies` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub added_by: Vec<ObjectId>,
    /// Owning group, if the movie was added in a group context
    #[serde(default)]
    pub group_id: Option<ObjectId>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    pub fn new(input: CreateMovie, creator: ObjectId, group_id: Option<ObjectId>) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            title: input.title,
            genre: input.genre,
            year: input.year,
            director: input.director,
            added_at: input.added_at,
            added_by: vec![creator],
            group_id,
            ratings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Mean of all ratings, `None` when unrated
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let total: i64 = self.ratings.iter().map(|r| i64::from(r.rating)).sum();
        Some(total as f64 / self.ratings.len() as f64)
    }

    /// Mirror of the `$set` the store performs for an update
    pub fn apply_update(&mut self, input: UpdateMovie) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(genre) = input.genre {
            self.genre = genre;
        }
        if let Some(year) = input.year {
            self.year = Some(year);
        }
        if let Some(director) = input.director {
            self.director = Some(director);
        }
        if let Some(added_at) = input.added_at {
            self.added_at = added_at;
        }
        self.updated_at = Utc::now();
    }
}

/// DTO for adding a movie; the creator comes from the session
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMovie {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Genre is required"))]
    pub genre: String,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub added_at: DateTime<Utc>,
    /// Group to attach the movie to, as a hex ObjectId
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMovie {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    pub user_id: String,
    pub rating: i32,
}

impl From<&Rating> for RatingResponse {
    fn from(rating: &Rating) -> Self {
        Self {
            user_id: rating.user_id.to_hex(),
            rating: rating.rating,
        }
    }
}

/// Movie as stored, with ids rendered as hex strings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovieResponse {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub added_at: DateTime<Utc>,
    pub added_by: Vec<String>,
    pub group_id: Option<String>,
    pub ratings: Vec<RatingResponse>,
    pub average_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id.to_hex(),
            average_rating: movie.average_rating(),
            ratings: movie.ratings.iter().map(RatingResponse::from).collect(),
            title: movie.title,
            genre: movie.genre,
            year: movie.year,
            director: movie.director,
            added_at: movie.added_at,
            added_by: movie.added_by.iter().map(|id| id.to_hex()).collect(),
            group_id: movie.group_id.map(|id| id.to_hex()),
            created_at: movie.created_at,
            updated_at: movie.updated_at,
        }
    }
}

/// Movie with `added_by` and `group` resolved for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovieDetails {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub added_at: DateTime<Utc>,
    pub added_by: Vec<UserSummary>,
    pub group: Option<GroupSummary>,
    pub ratings: Vec<RatingResponse>,
    pub average_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input() -> CreateMovie {
        CreateMovie {
            title: "Dune".into(),
            genre: "Sci-Fi".into(),
            year: Some(2021),
            director: None,
            added_at: Utc::now(),
            group_id: None,
        }
    }

    #[test]
    fn test_new_movie_records_creator() {
        let creator = ObjectId::new();
        let group = ObjectId::new();
        let movie = Movie::new(create_input(), creator, Some(group));

        assert_eq!(movie.added_by, vec![creator]);
        assert_eq!(movie.group_id, Some(group));
        assert!(movie.ratings.is_empty());
    }

    #[test]
    fn test_average_rating() {
        let mut movie = Movie::new(create_input(), ObjectId::new(), None);
        assert_eq!(movie.average_rating(), None);

        let user = ObjectId::new();
        movie.ratings = vec![
            Rating { user_id: user, rating: 5 },
            Rating { user_id: user, rating: 2 },
        ];
        assert_eq!(movie.average_rating(), Some(3.5));
    }

    #[test]
    fn test_title_and_genre_required() {
        let mut input = create_input();
        assert!(input.validate().is_ok());

        input.title = String::new();
        assert!(input.validate().is_err());

        let mut input = create_input();
        input.genre = String::new();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_added_at_is_required_on_the_wire() {
        let json = r#"{"title":"Dune","genre":"Sci-Fi"}"#;
        assert!(serde_json::from_str::<CreateMovie>(json).is_err());
    }
}
