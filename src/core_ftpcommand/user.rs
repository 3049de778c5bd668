use crate::session::Session;
use log::info;

/// Handles the USER FTP command.
///
/// Records the username for the session and asks for a password. No account
/// lookup happens, every name is accepted.
///
/// # Arguments
///
/// * `session` - The session issuing the command.
/// * `username` - The username provided by the client.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating whether the reply could be written.
pub async fn handle_user_command(session: &mut Session, username: String) -> Result<(), std::io::Error> {
    info!("Received USER command with username: {}", username);

    let response = if username.eq_ignore_ascii_case("anonymous") {
        info!("Anonymous login initiated from {}", session.peer_address);
        "331 Anonymous login okay, send your complete email address as password."
    } else {
        "331 User name okay, need password."
    };

    session.username = Some(username);
    session.send_response(response).await
}
