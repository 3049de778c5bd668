use crate::session::Session;
use log::info;

/// Handles the SYST (System) FTP command.
///
/// This function sends a response to the client indicating the system type of the server.
pub async fn handle_syst_command(session: &mut Session, _arg: String) -> Result<(), std::io::Error> {
    // Define the system type. Typically "UNIX" for Unix-like systems.
    let system_type = "215 UNIX Type: L8";

    info!("Responding to SYST command with system type.");
    session.send_response(system_type).await
}
