use crate::core_network::error::DataChannelError;
use crate::session::Session;
use log::{debug, error};
use std::net::SocketAddrV4;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Handles the PASV FTP command.
///
/// Puts the session in passive mode and tells the client where to open the
/// data connection. The connection itself is accepted later, by the command
/// that needs it.
pub async fn handle_pasv_command(session: &mut Session, _arg: String) -> Result<(), std::io::Error> {
    match session.enter_passive().await {
        Ok(endpoint) => {
            let pasv_response = format_pasv_response(endpoint);
            session.send_response(&pasv_response).await
        }
        Err(e) => {
            error!("Session {}: failed to enter passive mode: {}", session.id, e);
            session.send_response(&e.to_ftp_response()).await
        }
    }
}

/// Encodes the endpoint as `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`.
pub fn format_pasv_response(endpoint: SocketAddrV4) -> String {
    let [h1, h2, h3, h4] = endpoint.ip().octets();
    let port = endpoint.port();
    format!(
        "227 Entering Passive Mode ({},{},{},{},{},{})",
        h1,
        h2,
        h3,
        h4,
        (port >> 8) & 0xFF,
        port & 0xFF
    )
}

/// Binds the passive mode listener on the configured data port.
pub async fn bind_pasv_listener(address: &str, port: u16) -> Result<TcpListener, DataChannelError> {
    let listener = TcpListener::bind((address, port))
        .await
        .map_err(|e| DataChannelError::Bind(port, e))?;
    debug!("PASV listener set up on {}:{}", address, port);
    Ok(listener)
}

/// Accepts the incoming connection on the passive listener.
pub async fn accept_pasv_connection(
    listener: &TcpListener,
    timeout: Duration,
) -> Result<TcpStream, DataChannelError> {
    match tokio::time::timeout(timeout, listener.accept()).await {
        Ok(Ok((data_stream, addr))) => {
            debug!("Accepted data connection from: {}", addr);
            Ok(data_stream)
        }
        Ok(Err(e)) => Err(DataChannelError::Accept(e)),
        Err(_) => Err(DataChannelError::AcceptTimeout(timeout)),
    }
}
