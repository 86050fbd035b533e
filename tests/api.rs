use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::{json, Value};

use kawauso::api::{create_app, create_router};
use kawauso::database::Database;
use kawauso::model::{MediaAsset, User, Video};

async fn server() -> (TestServer, Database) {
    let database = Database::memory().await.expect("in-memory database");
    let app = create_app(database.clone());
    let server = TestServer::new(create_router(app)).expect("test server");
    (server, database)
}

fn actor(user: &User) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_str(&user.id.key()).expect("header value"),
    )
}

async fn seed_user(db: &Database, username: &str) -> User {
    let user = User::new(username.to_string(), format!("{username} test"), None);
    user.create(db).await.expect("create user");
    user
}

async fn seed_video(db: &Database, owner: &User, title: &str) -> Video {
    let asset = MediaAsset::new(
        format!("https://cdn.example.com/{title}").parse().unwrap(),
        title.to_string(),
    );
    let video = Video::new(
        owner.id.clone(),
        title.to_string(),
        format!("{title} description"),
        asset.clone(),
        asset,
        42.0,
    );
    video.create(db).await.expect("create video");
    video
}

#[tokio::test]
async fn like_toggle_roundtrip_uses_the_envelope() {
    let (server, db) = server().await;
    let owner = seed_user(&db, "creator").await;
    let fan = seed_user(&db, "fan").await;
    let video = seed_video(&db, &owner, "clip").await;

    let (name, value) = actor(&fan);
    let path = format!("/likes/videos/{}", video.id.key());

    let response = server.post(&path).add_header(name.clone(), value.clone()).await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["statusCode"], json!(200));
    assert_eq!(body["data"]["state"], json!("added"));
    assert_eq!(body["message"], json!("Video liked"));

    let response = server.post(&path).add_header(name, value).await;
    let body: Value = response.json();
    assert_eq!(body["data"]["state"], json!("removed"));
    assert_eq!(body["message"], json!("Video unliked"));
}

#[tokio::test]
async fn failures_use_the_error_envelope() {
    let (server, db) = server().await;
    let fan = seed_user(&db, "fan").await;
    let (name, value) = actor(&fan);

    // nonexistent channel -> 404
    let response = server.get("/channels/nope/stats").await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["statusCode"], json!(404));
    assert!(body["message"].as_str().unwrap().contains("not found"));
    assert!(body["errors"].as_array().unwrap().is_empty());

    // malformed id -> 400
    let response = server
        .post("/likes/videos/not%20a%20valid%20id")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 400);

    // mutation without a verified actor -> 400
    let response = server.post("/subscriptions/somebody").await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("missing authenticated actor"));
}

#[tokio::test]
async fn comments_can_be_added_and_listed() {
    let (server, db) = server().await;
    let owner = seed_user(&db, "creator").await;
    let commenter = seed_user(&db, "commenter").await;
    let video = seed_video(&db, &owner, "clip").await;

    let (name, value) = actor(&commenter);
    let response = server
        .post(&format!("/videos/{}/comments", video.id.key()))
        .add_header(name, value)
        .json(&json!({ "content": "great video" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server
        .get(&format!("/videos/{}/comments", video.id.key()))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let comments = body["data"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["content"], json!("great video"));
    assert_eq!(comments[0]["owner"]["username"], json!("commenter"));
}

#[tokio::test]
async fn non_owner_deletion_is_forbidden() {
    let (server, db) = server().await;
    let owner = seed_user(&db, "creator").await;
    let intruder = seed_user(&db, "intruder").await;
    let video = seed_video(&db, &owner, "clip").await;

    let (name, value) = actor(&intruder);
    let response = server
        .delete(&format!("/videos/{}", video.id.key()))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["statusCode"], json!(403));
    assert!(Video::find(&video.id, &db).await.unwrap().is_some());
}
