//! Login, signup and session cookie handling against a live server.

mod common;

use common::{TestApp, COOKIE_NAME};
use foodshare::auth::password::hash_password;
use foodshare::db;
use reqwest::header;
use reqwest::StatusCode;

fn session_cookie_from(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .filter(|pair| pair.starts_with(COOKIE_NAME))
        .map(str::to_string)
}

fn seed_password_user(app: &TestApp, username: &str, password: &str) {
    let hash = hash_password(password).unwrap();
    let conn = app.pool.get().unwrap();
    db::insert_user(&conn, username, None, &hash).unwrap();
}

#[tokio::test]
async fn login_page_renders_for_visitors() {
    let app = TestApp::spawn().await;
    let response = app.http.get(app.url("/login")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains(r#"action="/login""#));
}

#[tokio::test]
async fn login_page_sends_signed_in_users_on() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.login_as("alice", "Alice");
    let response = app
        .http
        .get(app.url("/login"))
        .header(header::COOKIE, cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/donate-food");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::spawn().await;
    seed_password_user(&app, "carol", "correct horse");

    let response = app
        .http
        .post(app.url("/login"))
        .form(&[("username", "carol"), ("password", "battery staple")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie_from(&response).is_none());
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Invalid username or password"));
}

#[tokio::test]
async fn correct_password_opens_donation_page() {
    let app = TestApp::spawn().await;
    seed_password_user(&app, "carol", "correct horse");

    let response = app
        .http
        .post(app.url("/login"))
        .form(&[("username", "carol"), ("password", "correct horse")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/donate-food");
    let cookie = session_cookie_from(&response).expect("session cookie");

    let page = app
        .http
        .get(app.url("/donate-food"))
        .header(header::COOKIE, cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("Hello, carol"));
}

#[tokio::test]
async fn signup_creates_account_and_session() {
    let app = TestApp::spawn().await;

    let response = app
        .http
        .post(app.url("/signup"))
        .form(&[
            ("username", "dave"),
            ("display_name", "Dave D."),
            ("password", "longenough"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(session_cookie_from(&response).is_some());

    let conn = app.pool.get().unwrap();
    let user = db::find_user_by_username(&conn, "dave").unwrap().unwrap();
    assert_eq!(user.display_name(), "Dave D.");
}

#[tokio::test]
async fn signup_rejects_taken_username_and_short_password() {
    let app = TestApp::spawn().await;
    app.login_as("erin", "Erin");

    let taken = app
        .http
        .post(app.url("/signup"))
        .form(&[("username", "erin"), ("password", "longenough")])
        .send()
        .await
        .unwrap();
    assert_eq!(taken.status(), StatusCode::CONFLICT);

    let short = app
        .http
        .post(app.url("/signup"))
        .form(&[("username", "frank"), ("password", "short")])
        .send()
        .await
        .unwrap();
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
    assert!(short
        .text()
        .await
        .unwrap()
        .contains("Password must be at least 8 characters"));
}
