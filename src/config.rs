use clap::Parser;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "foodshare", about = "Leftover food donation portal")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// URL the donation form posts to
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub donations: DonationsConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DonationsConfig {
    /// Save endpoint. Resolved to this server's own `/api/save-food` when unset.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "foodshare_session".to_string(),
            session_hours: 720,
        }
    }
}

impl Default for DonationsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref endpoint) = cli.endpoint {
            config.donations.endpoint = Some(endpoint.clone());
        }

        // Resolve paths relative to data dir
        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("foodshare.db"));
        }
        if config.donations.endpoint.is_none() {
            config.donations.endpoint = Some(config.default_endpoint());
        }

        let endpoint = config.save_endpoint();
        url::Url::parse(endpoint)
            .map_err(|e| anyhow::anyhow!("Invalid donations endpoint {}: {}", endpoint, e))?;

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".foodshare")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("foodshare.db"))
    }

    pub fn save_endpoint(&self) -> &str {
        self.donations
            .endpoint
            .as_deref()
            .unwrap_or("http://127.0.0.1:3000/api/save-food")
    }

    pub fn save_timeout(&self) -> Duration {
        Duration::from_secs(self.donations.timeout_secs)
    }

    /// The form posts back to this server when no external endpoint is set.
    /// A wildcard bind address is not routable, so loopback is used instead.
    fn default_endpoint(&self) -> String {
        let host = match self.server.host.parse::<IpAddr>() {
            Ok(ip) if ip.is_unspecified() => "127.0.0.1".to_string(),
            Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
            _ => self.server.host.clone(),
        };
        format!("http://{}:{}/api/save-food", host, self.server.port)
    }

    /// Socket address for the listener.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid host {}: {}", self.server.host, e))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
