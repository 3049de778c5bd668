use crate::session::Session;

pub async fn handle_noop_command(session: &mut Session, _arg: String) -> Result<(), std::io::Error> {
    session.send_response("200 NOOP ok.").await
}
