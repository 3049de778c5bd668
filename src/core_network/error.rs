// Error handling for the data channel
use crate::config::ConfigError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataChannelError {
    #[error("No data connection has been negotiated")]
    NotConfigured,

    #[error("Invalid passive address: {0}")]
    InvalidPasvAddress(#[from] ConfigError),

    #[error("Failed to bind passive listener on port {0}: {1}")]
    Bind(u16, #[source] std::io::Error),

    #[error("Failed to accept data connection: {0}")]
    Accept(#[source] std::io::Error),

    #[error("Timed out after {0:?} waiting for the data connection")]
    AcceptTimeout(Duration),

    #[error("Data transfer failed: {0}")]
    Transfer(#[source] std::io::Error),

    #[error("Data connection is not open")]
    NotConnected,
}

impl DataChannelError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            DataChannelError::NotConfigured => "425 Use PASV first.".to_string(),
            _ => "425 Can't open data connection.".to_string(),
        }
    }
}
