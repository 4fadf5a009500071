use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::auth::{CookieSession, Session};
use crate::error::AppError;
use crate::state::AppState;

/// Session context for the request. Never rejects: a missing or stale cookie
/// resolves to an anonymous context.
impl FromRequestParts<AppState> for CookieSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = get_cookie_value(parts, &state.config.auth.cookie_name);
        CookieSession::resolve(&state.db, token)
    }
}

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session: Session,
    pub token: String,
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provider = CookieSession::from_request_parts(parts, state).await?;
        match (provider.session(), provider.token()) {
            (Some(session), Some(token)) => Ok(CurrentUser {
                session: session.clone(),
                token: token.to_string(),
            }),
            _ => Err(AppError::Unauthorized),
        }
    }
}

pub fn get_cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}
