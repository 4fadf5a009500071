pub mod handlers;
pub mod password;
pub mod session;

pub use session::{CookieSession, Session, SessionProvider, SessionStatus};

pub const LOGIN_PATH: &str = "/login";
