use crate::config::Config;
use crate::core_network::connection_mode::ConnectionMode;
use log::{debug, warn};
use std::borrow::Cow;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Opaque key under which a session is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-client state, owned by the task running its session loop.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub peer_address: SocketAddr,
    pub current_dir: String,
    pub type_: String,            // The primary transfer type (A, E, I, L)
    pub byte_size: Option<u8>,    // The byte size for TYPE L (None if not applicable)
    pub username: Option<String>, // Name given with USER, never verified
    pub running: bool,
    pub config: Arc<Config>,
    pub(crate) control: TcpStream,
    pub(crate) data_stream: Option<TcpStream>,
    pub(crate) pasv_listener: Option<TcpListener>,
    pub(crate) mode: ConnectionMode,
    buffer: Vec<u8>,
}

impl Session {
    pub fn new(id: SessionId, control: TcpStream, peer_address: SocketAddr, config: Arc<Config>) -> Self {
        let buffer = vec![0; config.server.buffer_size];
        Self {
            id,
            peer_address,
            current_dir: String::from("/"),
            type_: "A".to_string(), // Default transfer type is ASCII
            byte_size: None,
            username: None,
            running: true,
            config,
            control,
            data_stream: None,
            pasv_listener: None,
            mode: ConnectionMode::None,
            buffer,
        }
    }

    /// Writes one reply line on the control channel, CRLF appended.
    pub async fn send_response(&mut self, message: &str) -> Result<(), std::io::Error> {
        debug!("Session {} -> {}", self.id, message);
        self.control.write_all(message.as_bytes()).await?;
        self.control.write_all(b"\r\n").await?;
        Ok(())
    }

    /// Reads whatever the client sent next into the session buffer.
    ///
    /// Returns the byte count; zero means the peer closed the control channel.
    /// No line framing is applied, so one read can hold a partial command or
    /// several of them.
    pub async fn read_command(&mut self) -> Result<usize, std::io::Error> {
        self.buffer.fill(0);
        self.control.read(&mut self.buffer).await
    }

    pub fn message(&self, len: usize) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer[..len.min(self.buffer.len())])
    }

    pub fn connection_mode(&self) -> ConnectionMode {
        self.mode
    }

    pub fn has_data_channel(&self) -> bool {
        self.data_stream.is_some()
    }

    pub fn has_passive_listener(&self) -> bool {
        self.pasv_listener.is_some()
    }

    pub fn data_stream_mut(&mut self) -> Option<&mut TcpStream> {
        self.data_stream.as_mut()
    }

    /// Closes every socket the session owns. Called once the session has been
    /// removed from the registry.
    pub async fn release(mut self) {
        self.close_data();
        self.pasv_listener = None;
        if let Err(e) = self.control.shutdown().await {
            warn!("Session {}: failed to shut down control channel: {}", self.id, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tokio::io::AsyncReadExt;

    pub fn test_config() -> Config {
        let mut config = Config::default();
        config.server.listen_address = "127.0.0.1".to_string();
        config.server.listen_port = 0;
        config.server.pasv_address = "127.0.0.1".to_string();
        config.server.pasv_port = 0;
        config.server.data_accept_timeout_secs = 5;
        config
    }

    /// Builds a session over a loopback connection and returns the client end.
    pub async fn session_with_client(config: Config) -> (Session, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server_side, peer) = listener.accept().await.unwrap();
        (
            Session::new(SessionId(1), server_side, peer, Arc::new(config)),
            client,
        )
    }

    /// Reads a single CRLF-terminated reply line, without the terminator.
    pub async fn read_reply(client: &mut TcpStream) -> String {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        while !line.ends_with(b"\r\n") {
            let n = client.read(&mut byte).await.unwrap();
            assert!(n > 0, "control channel closed mid-reply");
            line.push(byte[0]);
        }
        line.truncate(line.len() - 2);
        String::from_utf8(line).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_new_session_defaults() {
        let (session, _client) = session_with_client(test_config()).await;
        assert_eq!(session.current_dir, "/");
        assert_eq!(session.connection_mode(), ConnectionMode::None);
        assert!(session.running);
        assert!(!session.has_data_channel());
        assert!(!session.has_passive_listener());
    }

    #[tokio::test]
    async fn test_send_response_appends_crlf() {
        let (mut session, mut client) = session_with_client(test_config()).await;
        session.send_response("200 Fine").await.unwrap();
        assert_eq!(read_reply(&mut client).await, "200 Fine");
    }

    #[tokio::test]
    async fn test_read_command_and_peer_close() {
        let (mut session, mut client) = session_with_client(test_config()).await;
        client.write_all(b"NOOP\r\n").await.unwrap();
        let n = session.read_command().await.unwrap();
        assert_eq!(session.message(n), "NOOP\r\n");

        drop(client);
        assert_eq!(session.read_command().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_release_closes_control_channel() {
        let (session, mut client) = session_with_client(test_config()).await;
        session.release().await;
        let mut buf = [0u8; 8];
        assert_eq!(client.read(&mut buf).await.unwrap(), 0);
    }
}
