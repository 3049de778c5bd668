use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pasv_address must be an IPv4 address, got {0:?}")]
    InvalidPasvAddress(String),

    #[error("buffer_size must be greater than zero")]
    ZeroBufferSize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub pasv_address: String, // Address advertised in the 227 reply
    pub pasv_port: u16,       // Fixed data port, 0 lets the OS pick one
    pub root_dir: PathBuf,
    pub banner: String,
    pub max_sessions: usize,
    pub buffer_size: usize,
    pub shutdown_grace_ms: u64,
    pub data_accept_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: 2121,
            pasv_address: String::from("127.0.0.1"),
            pasv_port: 2120,
            root_dir: PathBuf::from("."),
            banner: String::from("220 FTP server ready."),
            max_sessions: 64,
            buffer_size: 1024,
            shutdown_grace_ms: 1000,
            data_accept_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// The address sent to clients in the PASV reply.
    pub fn advertised_ip(&self) -> Result<Ipv4Addr, ConfigError> {
        self.pasv_address
            .parse()
            .map_err(|_| ConfigError::InvalidPasvAddress(self.pasv_address.clone()))
    }

    pub fn control_endpoint(&self) -> String {
        format!("{}:{}", self.listen_address, self.listen_port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn data_accept_timeout(&self) -> Duration {
        Duration::from_secs(self.data_accept_timeout_secs)
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.advertised_ip()?;
        if self.server.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        Ok(())
    }
}
