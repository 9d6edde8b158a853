mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use ballot::{config::Config, router, state::AppState};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::seeded_store;

async fn app() -> Router {
    router(AppState::with_store(Config::default(), seeded_store().await))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_health() {
    let app = app().await;

    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_statuses() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        Some(json!({ "username": "chief", "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let admin: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(admin["username"], "chief");

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        Some(json!({ "username": "chief", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "POST", "/login", Some(json!({ "user": "chief" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vote_flow() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/voters/verify",
        Some(json!({ "registration_number": "CS/99/999", "identity": "Nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "This registration number is not on the official roll."
    );

    let (status, body) = send(
        &app,
        "POST",
        "/voters/verify",
        Some(json!({ "registration_number": "cs/21/001", "identity": "Ada Lovelace" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let voter: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(voter["registration_number"], "CS/21/001");
    assert_eq!(voter["has_voted"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/votes",
        Some(json!({
            "registration_number": "CS/21/001",
            "operator": "chief",
            "votes": { "President": "Grace Hopper" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ballot = json!({
        "registration_number": "CS/21/001",
        "operator": "chief",
        "votes": { "President": "Grace Hopper", "Treasurer": "Linus Torvalds" }
    });

    let (status, body) = send(&app, "POST", "/votes", Some(ballot.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let record: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(record["adminOperator"], "chief");
    assert_eq!(record["voteType"], "physical");

    let (status, _) = send(&app, "POST", "/votes", Some(ballot)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", "/booth", None).await;
    assert_eq!(status, StatusCode::OK);
    let booth: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(booth["live_vote_count"], 1);
    assert_eq!(booth["voting_ended"], false);
    assert_eq!(booth["candidates"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_results_shape() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/results", None).await;
    assert_eq!(status, StatusCode::OK);

    let stats: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["totalVoters"], 0);

    let positions = stats["resultsByPosition"].as_array().unwrap();
    assert_eq!(positions.len(), 2);
    assert!(
        positions
            .iter()
            .flat_map(|p| p["results"].as_array().unwrap())
            .all(|r| r["percentage"] == 0.0)
    );
}

#[tokio::test]
async fn test_vote_with_unknown_candidate_rejected() {
    let app = app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/voters/verify",
        Some(json!({ "registration_number": "CS/21/001", "identity": "Ada Lovelace" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/votes",
        Some(json!({
            "registration_number": "CS/21/001",
            "operator": "chief",
            "votes": { "President": "Nobody", "Treasurer": "Typo" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/voters/verify",
        Some(json!({ "registration_number": "CS/21/001", "identity": "Ada Lovelace" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let voter: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(voter["has_voted"], false);

    let (_, body) = send(&app, "GET", "/booth", None).await;
    let booth: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(booth["live_vote_count"], 0);
}

#[tokio::test]
async fn test_vote_requires_known_operator() {
    let app = app().await;
    let ballot = |operator: &str| {
        json!({
            "registration_number": "CS/21/002",
            "operator": operator,
            "votes": { "President": "Grace Hopper", "Treasurer": "Linus Torvalds" }
        })
    };

    let (status, _) = send(&app, "POST", "/votes", Some(ballot(""))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/votes", Some(ballot("intruder"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&app, "GET", "/booth", None).await;
    let booth: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(booth["live_vote_count"], 0);
}
