use rand::Rng;
use rusqlite::{params, OptionalExtension};

use crate::error::AppResult;
use crate::state::DbPool;

/// Identity attached to a live session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
}

/// Where session resolution stands for the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Authenticated(Session),
    Anonymous,
}

/// Session context handed to views. Views never look sessions up on their own.
pub trait SessionProvider {
    fn status(&self) -> SessionStatus;

    /// End the session. Calling this on an anonymous context is a no-op.
    fn sign_out(&self) -> AppResult<()>;
}

/// Session provider backed by the `sessions` table and the session cookie.
#[derive(Clone)]
pub struct CookieSession {
    pool: DbPool,
    token: Option<String>,
    session: Option<Session>,
}

impl CookieSession {
    /// Resolve `token` against the database. Unknown or expired tokens yield an anonymous context.
    pub fn resolve(pool: &DbPool, token: Option<&str>) -> AppResult<Self> {
        let session = match token {
            Some(token) => find_session(pool, token)?,
            None => None,
        };
        Ok(Self {
            pool: pool.clone(),
            token: session.as_ref().and(token).map(str::to_string),
            session,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl SessionProvider for CookieSession {
    fn status(&self) -> SessionStatus {
        match &self.session {
            Some(session) => SessionStatus::Authenticated(session.clone()),
            None => SessionStatus::Anonymous,
        }
    }

    fn sign_out(&self) -> AppResult<()> {
        if let Some(token) = &self.token {
            delete_session(&self.pool, token)?;
            tracing::info!("Session ended for {:?}", self.session.as_ref().map(|s| &s.username));
        }
        Ok(())
    }
}

/// Create a new session for a user. Returns the session token.
pub fn create_session(pool: &DbPool, user_id: &str, hours: u64) -> AppResult<String> {
    let conn = pool.get()?;

    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token, expires_at) VALUES (?1, ?2, ?3, datetime('now', ?4))",
        params![id, user_id, token, format!("+{} hours", hours)],
    )?;

    Ok(token)
}

/// Look up the unexpired session for `token`.
pub fn find_session(pool: &DbPool, token: &str) -> AppResult<Option<Session>> {
    let conn = pool.get()?;
    let session = conn
        .query_row(
            "SELECT u.id, u.username, COALESCE(u.display_name, u.username) FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = ?1 AND s.expires_at > datetime('now')",
            params![token],
            |row| {
                Ok(Session {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    display_name: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(session)
}

/// Delete a session by token.
pub fn delete_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

pub fn session_cookie(cookie_name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        cookie_name, token, max_age_secs
    )
}

pub fn clear_session_cookie(cookie_name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", cookie_name)
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
