//! Data-connection state of a session.
//!
//! A session is in exactly one of three modes. The passive listener only
//! exists in `Passive` mode and only until a data connection was accepted on
//! it; the data stream only exists in `Active` or `Passive` mode.

use crate::core_network::error::DataChannelError;
use crate::core_network::pasv::{accept_pasv_connection, bind_pasv_listener};
use crate::session::Session;
use log::{debug, info, warn};
use std::net::SocketAddrV4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    #[default]
    None,
    Active, // Reserved for PORT, never entered yet
    Passive,
}

impl Session {
    /// Opens the passive listener and switches to `Passive`.
    ///
    /// Whatever data-connection state existed before is torn down first, so
    /// issuing PASV repeatedly never leaves a second listener behind. Returns
    /// the endpoint to advertise to the client.
    pub async fn enter_passive(&mut self) -> Result<SocketAddrV4, DataChannelError> {
        match self.mode {
            ConnectionMode::Passive => self.stop_passive(),
            ConnectionMode::Active => self.close_data(),
            ConnectionMode::None => {}
        }

        let advertised_ip = self.config.server.advertised_ip()?;
        let listener =
            bind_pasv_listener(&self.config.server.listen_address, self.config.server.pasv_port)
                .await?;
        let port = listener
            .local_addr()
            .map_err(|e| DataChannelError::Bind(self.config.server.pasv_port, e))?
            .port();

        self.pasv_listener = Some(listener);
        self.mode = ConnectionMode::Passive;
        info!("Session {} entered passive mode on port {}", self.id, port);
        Ok(SocketAddrV4::new(advertised_ip, port))
    }

    /// Waits for the client's data connection and stores it on the session.
    pub async fn accept_data(&mut self) -> Result<(), DataChannelError> {
        match self.mode {
            ConnectionMode::None => Err(DataChannelError::NotConfigured),
            ConnectionMode::Active => {
                warn!("Session {}: active mode data connections are not supported", self.id);
                Ok(())
            }
            ConnectionMode::Passive => {
                if self.data_stream.is_some() {
                    return Ok(());
                }
                let timeout = self.config.server.data_accept_timeout();
                let listener = self
                    .pasv_listener
                    .as_ref()
                    .ok_or(DataChannelError::NotConfigured)?;
                let stream = accept_pasv_connection(listener, timeout).await?;

                // One accept per PASV: the listener goes away once the data
                // connection exists.
                self.pasv_listener = None;
                self.data_stream = Some(stream);
                Ok(())
            }
        }
    }

    /// Drops the data connection and any passive listener, back to `None`.
    pub fn close_data(&mut self) {
        if self.mode != ConnectionMode::None {
            self.data_stream = None;
            self.stop_passive();
            self.mode = ConnectionMode::None;
            debug!("Session {}: data channel closed", self.id);
        }
    }

    /// Leaves `Passive` mode. No-op in any other mode.
    pub fn stop_passive(&mut self) {
        if self.mode == ConnectionMode::Passive {
            self.pasv_listener = None;
            self.data_stream = None;
            self.mode = ConnectionMode::None;
            debug!("Session {}: passive listener closed", self.id);
        }
    }

    /// True when the sockets held match the current mode.
    pub(crate) fn mode_invariant_holds(&self) -> bool {
        let data_ok = self.data_stream.is_none() || self.mode != ConnectionMode::None;
        let listener_ok = self.pasv_listener.is_none() || self.mode == ConnectionMode::Passive;
        let exclusive = !(self.data_stream.is_some() && self.pasv_listener.is_some());
        data_ok && listener_ok && exclusive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::*;
    use tokio::net::TcpStream;

    fn free_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_enter_passive_from_none() {
        let (mut session, _client) = session_with_client(test_config()).await;
        let endpoint = session.enter_passive().await.unwrap();

        assert_eq!(session.connection_mode(), ConnectionMode::Passive);
        assert!(session.has_passive_listener());
        assert_eq!(endpoint.ip().octets(), [127, 0, 0, 1]);
        assert_ne!(endpoint.port(), 0);
        assert!(session.mode_invariant_holds());
    }

    #[tokio::test]
    async fn test_repeated_pasv_on_fixed_port_reuses_it() {
        let mut config = test_config();
        config.server.pasv_port = free_port();
        let (mut session, _client) = session_with_client(config).await;

        // The second bind would fail with the port in use if the first
        // listener were still open.
        let first = session.enter_passive().await.unwrap();
        let second = session.enter_passive().await.unwrap();
        assert_eq!(first, second);
        assert!(session.mode_invariant_holds());

        TcpStream::connect(("127.0.0.1", second.port())).await.unwrap();
        session.accept_data().await.unwrap();
        assert!(session.has_data_channel());
    }

    #[tokio::test]
    async fn test_accept_data_stores_stream_and_drops_listener() {
        let (mut session, _client) = session_with_client(test_config()).await;
        let endpoint = session.enter_passive().await.unwrap();

        let _data = TcpStream::connect(("127.0.0.1", endpoint.port())).await.unwrap();
        session.accept_data().await.unwrap();

        assert_eq!(session.connection_mode(), ConnectionMode::Passive);
        assert!(session.has_data_channel());
        assert!(!session.has_passive_listener());
        assert!(session.mode_invariant_holds());
    }

    #[tokio::test]
    async fn test_accept_data_without_pasv_fails() {
        let (mut session, _client) = session_with_client(test_config()).await;
        let err = session.accept_data().await.unwrap_err();
        assert!(matches!(err, DataChannelError::NotConfigured));
        assert_eq!(err.to_ftp_response(), "425 Use PASV first.");
    }

    #[tokio::test]
    async fn test_accept_data_in_active_mode_is_noop() {
        let (mut session, _client) = session_with_client(test_config()).await;
        session.mode = ConnectionMode::Active;
        session.accept_data().await.unwrap();
        assert!(!session.has_data_channel());
        assert_eq!(session.connection_mode(), ConnectionMode::Active);
    }

    #[tokio::test]
    async fn test_accept_data_times_out() {
        let mut config = test_config();
        config.server.data_accept_timeout_secs = 0;
        let (mut session, _client) = session_with_client(config).await;
        session.enter_passive().await.unwrap();

        let err = session.accept_data().await.unwrap_err();
        assert!(matches!(err, DataChannelError::AcceptTimeout(_)));
        assert!(session.has_passive_listener());
    }

    #[tokio::test]
    async fn test_close_data_returns_to_none() {
        let (mut session, _client) = session_with_client(test_config()).await;
        let endpoint = session.enter_passive().await.unwrap();
        let _data = TcpStream::connect(("127.0.0.1", endpoint.port())).await.unwrap();
        session.accept_data().await.unwrap();

        session.close_data();
        assert_eq!(session.connection_mode(), ConnectionMode::None);
        assert!(!session.has_data_channel());
        assert!(!session.has_passive_listener());

        // Nothing left to close.
        session.close_data();
        assert_eq!(session.connection_mode(), ConnectionMode::None);
    }

    #[tokio::test]
    async fn test_stop_passive_only_acts_in_passive() {
        let (mut session, _client) = session_with_client(test_config()).await;
        session.mode = ConnectionMode::Active;
        session.stop_passive();
        assert_eq!(session.connection_mode(), ConnectionMode::Active);

        session.mode = ConnectionMode::None;
        session.enter_passive().await.unwrap();
        session.stop_passive();
        assert_eq!(session.connection_mode(), ConnectionMode::None);
        assert!(!session.has_passive_listener());
        assert!(session.mode_invariant_holds());
    }

    #[tokio::test]
    async fn test_enter_passive_from_active_closes_data() {
        let (mut session, _client) = session_with_client(test_config()).await;
        session.mode = ConnectionMode::Active;
        session.enter_passive().await.unwrap();
        assert_eq!(session.connection_mode(), ConnectionMode::Passive);
        assert!(!session.has_data_channel());
    }
}
