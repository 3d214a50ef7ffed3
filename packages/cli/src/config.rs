// ABOUTME: Server configuration loaded from environment variables
// ABOUTME: Bind address, CORS origin, and database location with their defaults

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 4001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub cors_origin: String,
    /// `None` uses `~/.docuapp/docuapp.db`
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            database_path: None,
        }
    }
}

impl Config {
    /// Reads `HOST`, `PORT`, `CORS_ORIGIN` and `DOCUAPP_DATABASE_PATH`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidHost(host.clone()))?;
        }

        if let Ok(port_str) = env::var("PORT") {
            let port = port_str.parse::<u16>()?;
            if port == 0 {
                return Err(ConfigError::PortOutOfRange(port));
            }
            config.port = port;
        }

        if let Ok(origin) = env::var("CORS_ORIGIN") {
            config.cors_origin = origin;
        }

        config.database_path = env::var("DOCUAPP_DATABASE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
