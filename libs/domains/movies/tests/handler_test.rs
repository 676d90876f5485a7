//! Handler tests for Movies domain
//!
//! The three domains are wired together over in-memory repositories, the
//! same way the API binary wires them over MongoDB.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{JwtAuth, JwtConfig};
use domain_groups::{CreateGroup, GroupService, InMemoryGroupRepository};
use domain_movies::*;
use domain_users::{CreateUser, InMemoryUserRepository, User, UserService};
use http_body_util::BodyExt;
use ::mongodb::bson::oid::ObjectId;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

struct TestApp {
    users: UserService<InMemoryUserRepository>,
    groups: GroupService<InMemoryGroupRepository>,
    movies: MovieService<InMemoryMovieRepository>,
    jwt: JwtAuth,
}

impl TestApp {
    fn new() -> Self {
        let users = UserService::new(InMemoryUserRepository::new());
        let movie_repo = Arc::new(InMemoryMovieRepository::new());
        let groups = GroupService::new(
            InMemoryGroupRepository::new(),
            users.as_dyn(),
            Arc::new(MovieTitleLookup::new(movie_repo.clone())),
        );
        let movies = MovieService::from_arc(movie_repo, users.as_dyn(), groups.as_dyn());
        let jwt = JwtAuth::new(
            &JwtConfig::new("movies-handler-secret-movies-handler-secret").unwrap(),
        );
        Self {
            users,
            groups,
            movies,
            jwt,
        }
    }

    fn router(&self) -> Router {
        handlers::router(self.movies.clone(), self.jwt.clone())
    }

    async fn register(&self, login: &str) -> User {
        self.users
            .create(CreateUser {
                name: login.to_uppercase(),
                login: login.to_string(),
                password: "secret1".into(),
                password_hint: Some("pet".into()),
            })
            .await
            .unwrap()
    }

    fn bearer(&self, user: &User) -> String {
        format!("Bearer {}", self.jwt.create_token(&user.id, &user.login).unwrap())
    }
}

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: String, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", token);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: String) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn dune(group_id: Option<String>) -> Value {
    json!({
        "title": "Dune",
        "genre": "Sci-Fi",
        "added_at": chrono::Utc::now().to_rfc3339(),
        "group_id": group_id,
    })
}

#[tokio::test]
async fn test_movie_night_scenario() {
    let app = TestApp::new();
    let alice = app.register("alicelogin").await;
    let group = app
        .groups
        .create(CreateGroup { name: "Movie Night".into() }, alice.id)
        .await
        .unwrap();

    let response = app
        .router()
        .oneshot(post(
            "/".into(),
            Some(&app.bearer(&alice)),
            Some(dune(Some(group.id.to_hex()))),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response.into_body()).await;
    let movie_id = ObjectId::parse_str(body["id"].as_str().unwrap()).unwrap();
    assert_eq!(body["group_id"], json!(group.id.to_hex()));
    assert_eq!(body["added_by"], json!([alice.id.to_hex()]));

    let group_view = app.groups.find_one(group.id).await.unwrap();
    assert_eq!(group_view.shared_watchlist.len(), 1);
    assert_eq!(group_view.shared_watchlist[0].movie_id, movie_id.to_hex());
    assert_eq!(group_view.shared_watchlist[0].title, "Dune");

    let alice = app.users.find_one(alice.id).await.unwrap();
    assert_eq!(alice.movies_added, 1);

    let response = app
        .router()
        .oneshot(get(format!("/group/{}", group.id.to_hex())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response.into_body()).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], json!(movie_id.to_hex()));
}

#[tokio::test]
async fn test_create_requires_token() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(post("/".into(), None, Some(dune(None))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let token = app.bearer(&alice);

    let response = app
        .router()
        .oneshot(post(
            "/".into(),
            Some(&token),
            Some(json!({
                "title": "",
                "genre": "Sci-Fi",
                "added_at": chrono::Utc::now().to_rfc3339()
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response.into_body()).await["error"], "VALIDATION_ERROR");

    let response = app
        .router()
        .oneshot(post("/".into(), Some(&token), Some(dune(Some("nope".into())))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response.into_body()).await["error"], "INVALID_OBJECT_ID");
}

#[tokio::test]
async fn test_create_in_missing_group_is_404_and_saves_nothing() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let response = app
        .router()
        .oneshot(post(
            "/".into(),
            Some(&app.bearer(&alice)),
            Some(dune(Some(ObjectId::new().to_hex()))),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.movies.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_ratings_accumulate() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let movie = app
        .movies
        .create(serde_json::from_value(dune(None)).unwrap(), alice.id)
        .await
        .unwrap();
    let token = app.bearer(&bob);

    for rating in [5, 3] {
        let response = app
            .router()
            .oneshot(post(
                format!("/{}/ratings", movie.id.to_hex()),
                Some(&token),
                Some(json!({ "rating": rating })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .router()
        .oneshot(get(format!("/{}", movie.id.to_hex())))
        .await
        .unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(
        body["ratings"],
        json!([
            { "user_id": bob.id.to_hex(), "rating": 5 },
            { "user_id": bob.id.to_hex(), "rating": 3 }
        ])
    );
    assert_eq!(body["average_rating"], json!(4.0));
    assert_eq!(
        body["added_by"],
        json!([{ "id": alice.id.to_hex(), "name": "ALICE" }])
    );
}

#[tokio::test]
async fn test_rating_out_of_range_is_rejected() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let movie = app
        .movies
        .create(serde_json::from_value(dune(None)).unwrap(), alice.id)
        .await
        .unwrap();

    let response = app
        .router()
        .oneshot(post(
            format!("/{}/ratings", movie.id.to_hex()),
            Some(&app.bearer(&alice)),
            Some(json!({ "rating": 6 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_attach_to_group_after_the_fact() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let group = app
        .groups
        .create(CreateGroup { name: "Movie Night".into() }, alice.id)
        .await
        .unwrap();
    let movie = app
        .movies
        .create(serde_json::from_value(dune(None)).unwrap(), alice.id)
        .await
        .unwrap();
    let uri = format!("/{}/group/{}", movie.id.to_hex(), group.id.to_hex());

    for _ in 0..2 {
        let response = app
            .router()
            .oneshot(post(uri.clone(), Some(&app.bearer(&alice)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = app.movies.get(movie.id).await.unwrap();
    assert_eq!(stored.group_id, Some(group.id));
    let group = app.groups.get(group.id).await.unwrap();
    assert_eq!(group.shared_watchlist.len(), 1);

    let details = app.movies.find_one(movie.id).await.unwrap();
    assert_eq!(details.group.map(|g| g.name), Some("Movie Night".to_string()));
}

#[tokio::test]
async fn test_missing_movie_is_404() {
    let app = TestApp::new();
    let uri = format!("/{}", ObjectId::new().to_hex());

    let response = app.router().oneshot(get(uri.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("PATCH")
        .uri(&uri)
        .header("content-type", "application/json")
        .body(Body::from(json!({ "genre": "Drama" }).to_string()))
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_then_delete() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let movie = app
        .movies
        .create(serde_json::from_value(dune(None)).unwrap(), alice.id)
        .await
        .unwrap();
    let uri = format!("/{}", movie.id.to_hex());

    let request = Request::builder()
        .method("PATCH")
        .uri(&uri)
        .header("content-type", "application/json")
        .body(Body::from(json!({ "director": "Denis Villeneuve", "year": 2021 }).to_string()))
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["director"], "Denis Villeneuve");
    assert_eq!(body["year"], 2021);
    assert_eq!(body["title"], "Dune");

    let request = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
