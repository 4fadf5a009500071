//! Shared harness: a real server on an ephemeral port backed by a temp database.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use foodshare::auth::session;
use foodshare::config::Config;
use foodshare::db;
use foodshare::donation::{FormStore, PreviewRegistry};
use foodshare::routes;
use foodshare::state::{AppState, DbPool};
use tempfile::TempDir;
use tokio::sync::Mutex;

pub const COOKIE_NAME: &str = "foodshare_session";

pub struct TestApp {
    pub base: String,
    pub pool: DbPool,
    pub previews: PreviewRegistry,
    pub forms: Arc<Mutex<FormStore>>,
    pub http: reqwest::Client,
    _tmp: TempDir,
}

impl TestApp {
    /// Server whose form saves through its own `/api/save-food`.
    pub async fn spawn() -> Self {
        Self::spawn_with_endpoint(None).await
    }

    /// Server whose form saves to `endpoint` instead.
    pub async fn spawn_with_endpoint(endpoint: Option<String>) -> Self {
        let tmp = TempDir::new().unwrap();
        let pool = db::create_pool(&tmp.path().join("test.db")).expect("create pool");
        db::run_migrations(&pool).expect("run migrations");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = Config::default();
        config.database.path = Some(tmp.path().join("test.db"));
        config.donations.endpoint =
            Some(endpoint.unwrap_or_else(|| format!("http://{}/api/save-food", addr)));
        config.donations.timeout_secs = 5;

        let state = AppState::new(pool.clone(), config).unwrap();
        let previews = state.previews.clone();
        let forms = state.forms.clone();
        serve(listener, routes::app(state));

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        TestApp {
            base: format!("http://{}", addr),
            pool,
            previews,
            forms,
            http,
            _tmp: tmp,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Create a user and a live session; returns (user id, cookie header value).
    pub fn login_as(&self, username: &str, display_name: &str) -> (String, String) {
        let user = {
            let conn = self.pool.get().unwrap();
            db::insert_user(&conn, username, Some(display_name), "unused-hash").unwrap()
        };
        let token = session::create_session(&self.pool, &user.id, 1).unwrap();
        (user.id, format!("{}={}", COOKIE_NAME, token))
    }

    pub fn donation_count(&self) -> i64 {
        let conn = self.pool.get().unwrap();
        conn.query_row("SELECT COUNT(*) FROM donations", [], |r| r.get(0))
            .unwrap()
    }
}

/// Run `app` on `listener` in the background.
pub fn serve(listener: tokio::net::TcpListener, app: Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

/// Stand-in save endpoint that always answers with `status` and `body`.
pub async fn spawn_save_endpoint(status: u16, body: &'static str) -> String {
    use axum::http::{header, StatusCode};
    use axum::routing::post;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/api/save-food",
        post(move || async move {
            (
                StatusCode::from_u16(status).unwrap(),
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
        }),
    );
    serve(listener, app);
    format!("http://{}/api/save-food", addr)
}

/// Save endpoint that waits `delay` before accepting. Returns its URL and a hit counter.
pub async fn spawn_slow_save_endpoint(
    delay: std::time::Duration,
) -> (String, Arc<std::sync::atomic::AtomicUsize>) {
    use axum::http::StatusCode;
    use axum::routing::post;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/api/save-food",
        post(move || {
            let counter = counter.clone();
            async move {
                tokio::time::sleep(delay).await;
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::CREATED, r#"{"id":"slow"}"#)
            }
        }),
    );
    serve(listener, app);
    (format!("http://{}/api/save-food", addr), hits)
}
