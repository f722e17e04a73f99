use std::{env, net::SocketAddr, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_uri: String,
    pub database_name: String,
    pub collection_name: String,
    pub bind_addr: String,
    pub bind_port: u16,
    pub home_template: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URI must not be empty")]
    EmptyDatabaseUri,
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_uri = lookup("DATABASE_URI")
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| "mongodb://localhost:27017".to_string());
        if database_uri.is_empty() {
            return Err(ConfigError::EmptyDatabaseUri);
        }

        let database_name = lookup("DATABASE_NAME").unwrap_or_else(|| "demo_todo".to_string());
        let collection_name = lookup("DATABASE_COLLECTION").unwrap_or_else(|| "todo".to_string());

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let bind_port = lookup("BIND_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(9000);

        let home_template = lookup("HOME_TEMPLATE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static/home.html"));

        let config = Self {
            database_uri,
            database_name,
            collection_name,
            bind_addr,
            bind_port,
            home_template,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}
