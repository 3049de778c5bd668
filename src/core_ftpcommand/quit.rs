use crate::session::Session;
use log::{error, info};

/// Handles the QUIT FTP command.
///
/// Sends the closing reply and stops the session loop. The sockets are closed
/// by the loop once the session has left the registry.
///
/// # Arguments
///
/// * `session` - The session issuing the command.
/// * `_arg` - The argument for the QUIT command (not used in this command).
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_quit_command(session: &mut Session, _arg: String) -> Result<(), std::io::Error> {
    info!("Received QUIT command from session {}. Closing connection.", session.id);
    session.running = false;

    if let Err(e) = session.send_response("221 Service closing control connection.").await {
        error!("Failed to send QUIT response: {}", e);
        return Err(e);
    }
    Ok(())
}
