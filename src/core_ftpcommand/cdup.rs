use crate::core_ftpcommand::utils::parent_dir;
use crate::session::Session;
use log::info;

pub async fn handle_cdup_command(session: &mut Session, _arg: String) -> Result<(), std::io::Error> {
    // Moving up from the root stays at the root.
    session.current_dir = parent_dir(&session.current_dir);
    info!("Directory successfully changed to: {}", session.current_dir);
    session.send_response("250 Directory successfully changed.").await
}
