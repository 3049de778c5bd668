use crate::session::Session;
use log::info;

// Nothing beyond RFC 959 is advertised yet.
const FEATURES: &[&str] = &[];

/// Handles the FEAT (Feature) FTP command.
///
/// This function responds with a list of supported features.
///
/// # Arguments
///
/// * `session` - The session issuing the command.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_feat_command(session: &mut Session, _arg: String) -> Result<(), std::io::Error> {
    let mut response = String::from("211-Features:\r\n");
    for feature in FEATURES {
        response.push(' ');
        response.push_str(feature);
        response.push_str("\r\n");
    }
    response.push_str("211 End");

    info!("Responding to FEAT command with supported features.");
    session.send_response(&response).await
}
