//! The `/api/save-food` collaborator endpoint.

mod common;

use common::TestApp;
use reqwest::header;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn valid_donation_is_created() {
    let app = TestApp::spawn().await;

    let response = app
        .http
        .post(app.url("/api/save-food"))
        .json(&json!({
            "description": "Vegetable curry",
            "quantity": "10 servings",
            "location": "Community kitchen",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert!(body["id"].as_str().is_some());
    assert_eq!(app.donation_count(), 1);
}

#[tokio::test]
async fn blank_field_is_rejected_with_json_message() {
    let app = TestApp::spawn().await;

    let response = app
        .http
        .post(app.url("/api/save-food"))
        .json(&json!({
            "description": "Vegetable curry",
            "quantity": "10 servings",
            "location": "  ",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Location is required");
    assert_eq!(app.donation_count(), 0);
}

#[tokio::test]
async fn malformed_body_is_rejected_with_json_message() {
    let app = TestApp::spawn().await;

    let response = app
        .http
        .post(app.url("/api/save-food"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(r#"{"description": 42}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn donations_are_listed_for_their_donor() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.login_as("alice", "Alice");
    let (_, bob) = app.login_as("bob", "Bob");

    for (cookie, description) in [(&alice, "Soup"), (&alice, "Bread"), (&bob, "Apples")] {
        let response = app
            .http
            .post(app.url("/api/save-food"))
            .header(header::COOKIE, cookie.as_str())
            .json(&json!({
                "description": description,
                "quantity": "1 box",
                "location": "Hall",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let listed: Vec<Value> = app
        .http
        .get(app.url("/api/donations"))
        .header(header::COOKIE, alice.as_str())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let descriptions: Vec<&str> = listed
        .iter()
        .map(|d| d["description"].as_str().unwrap())
        .collect();
    assert_eq!(descriptions, vec!["Bread", "Soup"]);
}

#[tokio::test]
async fn listing_requires_session() {
    let app = TestApp::spawn().await;
    let response = app.http.get(app.url("/api/donations")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
