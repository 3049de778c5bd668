pub mod connection_mode;
pub mod error;
pub mod network;
pub mod pasv;

pub use connection_mode::ConnectionMode;
pub use error::DataChannelError;
