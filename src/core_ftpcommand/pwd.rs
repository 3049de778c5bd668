// src/core_ftpcommand/pwd.rs
use crate::session::Session;

pub async fn handle_pwd_command(session: &mut Session, _arg: String) -> std::io::Result<()> {
    let response = format!("257 \"{}\"", session.current_dir);
    session.send_response(&response).await
}
