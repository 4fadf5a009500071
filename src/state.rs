use std::sync::Arc;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::donation::{FormStore, HttpSaveFoodClient, PreviewRegistry};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub forms: Arc<Mutex<FormStore>>,
    pub previews: PreviewRegistry,
    pub save_client: HttpSaveFoodClient,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> anyhow::Result<Self> {
        let previews = PreviewRegistry::new();
        let idle = Duration::from_secs(config.auth.session_hours * 3600);
        let save_client = HttpSaveFoodClient::new(config.save_endpoint(), config.save_timeout())?;
        tracing::info!("Donations are saved via {}", save_client.endpoint());

        Ok(Self {
            db,
            forms: Arc::new(Mutex::new(FormStore::new(previews.clone(), idle))),
            previews,
            save_client,
            config,
        })
    }
}
