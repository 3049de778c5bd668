use crate::core_ftpcommand::utils::resolve_path;
use crate::session::Session;
use log::info;

/// Handles the CWD FTP command.
///
/// Only the virtual working directory moves. Whether the target exists on
/// disk is left to the commands that read it.
pub async fn handle_cwd_command(session: &mut Session, arg: String) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return session
            .send_response("501 Syntax error in parameters or arguments.")
            .await;
    }

    session.current_dir = resolve_path(&session.current_dir, &arg);
    info!("Session {} changed directory to: {}", session.id, session.current_dir);
    session.send_response("250 Directory successfully changed.").await
}
