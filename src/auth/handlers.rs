use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::password::{self, MIN_PASSWORD_LEN};
use crate::auth::session::{self, CookieSession, SessionProvider, SessionStatus};
use crate::db;
use crate::db::models::User;
use crate::error::AppResult;
use crate::routes::home::Html;
use crate::state::AppState;

const AFTER_LOGIN: &str = "/donate-food";

// -- Templates --

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub username: String,
    pub display_name: String,
    pub error: Option<String>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    pub password: String,
}

/// Issue a session for `user` and send them on to the donation page.
fn start_session(state: &AppState, user: &User) -> AppResult<Response> {
    let hours = state.config.auth.session_hours;
    let token = session::create_session(&state.db, &user.id, hours)?;
    tracing::info!("Session started for {}", user.username);

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, AFTER_LOGIN.to_string()),
            (
                header::SET_COOKIE,
                session::session_cookie(&state.config.auth.cookie_name, &token, hours),
            ),
        ],
        "",
    )
        .into_response())
}

fn rerender<T: Template>(status: StatusCode, template: T) -> Response {
    (status, Html(template)).into_response()
}

// -- Login --

/// GET /login
pub async fn login_page(session: CookieSession) -> Response {
    if let SessionStatus::Authenticated(_) = session.status() {
        return Redirect::to(AFTER_LOGIN).into_response();
    }
    Html(LoginTemplate {
        username: String::new(),
        error: None,
    })
    .into_response()
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let username = form.username.trim().to_string();
    let user = {
        let conn = state.db.get()?;
        db::find_user_by_username(&conn, &username)?
    };

    match user {
        Some(user) if password::verify_password(&form.password, &user.password_hash) => {
            start_session(&state, &user)
        }
        _ => {
            tracing::info!("Failed login for {:?}", username);
            Ok(rerender(
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    username,
                    error: Some("Invalid username or password".into()),
                },
            ))
        }
    }
}

// -- Signup --

/// GET /signup
pub async fn signup_page(session: CookieSession) -> Response {
    if let SessionStatus::Authenticated(_) = session.status() {
        return Redirect::to(AFTER_LOGIN).into_response();
    }
    Html(SignupTemplate {
        username: String::new(),
        display_name: String::new(),
        error: None,
    })
    .into_response()
}

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let username = form.username.trim().to_string();
    let display_name = form.display_name.trim().to_string();

    let problem = if username.is_empty() {
        Some("Username is required".to_string())
    } else if form.password.len() < MIN_PASSWORD_LEN {
        Some(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ))
    } else {
        None
    };
    if let Some(error) = problem {
        return Ok(rerender(
            StatusCode::BAD_REQUEST,
            SignupTemplate {
                username,
                display_name,
                error: Some(error),
            },
        ));
    }

    let hash = password::hash_password(&form.password)?;
    let created = {
        let conn = state.db.get()?;
        if db::find_user_by_username(&conn, &username)?.is_some() {
            None
        } else {
            let display = Some(display_name.as_str()).filter(|s| !s.is_empty());
            Some(db::insert_user(&conn, &username, display, &hash)?)
        }
    };

    match created {
        Some(user) => {
            tracing::info!("Account created for {}", user.username);
            start_session(&state, &user)
        }
        None => Ok(rerender(
            StatusCode::CONFLICT,
            SignupTemplate {
                username,
                display_name,
                error: Some("That username is taken".into()),
            },
        )),
    }
}

