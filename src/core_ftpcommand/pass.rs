use crate::session::Session;

pub async fn handle_pass_command(session: &mut Session, _password: String) -> Result<(), std::io::Error> {
    session.send_response("230 User logged in, proceed.").await
}
