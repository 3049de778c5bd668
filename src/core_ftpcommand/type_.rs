use crate::session::Session;

/// Handles the TYPE FTP command.
///
/// Records the transfer type as either ASCII, EBCDIC, Binary, or Local Byte.
/// The type is kept on the session; nothing converts data according to it.
///
/// # Arguments
///
/// * `session` - The session issuing the command.
/// * `arg` - The argument specifying the transfer type.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_type_command(session: &mut Session, arg: String) -> Result<(), std::io::Error> {
    let parts: Vec<&str> = arg.split_whitespace().collect();
    let primary_type = parts.first().map(|s| s.to_uppercase()).unwrap_or_default();
    let second_arg = parts.get(1).copied();

    let response = match primary_type.as_str() {
        "A" | "E" | "I" => {
            session.type_ = primary_type.clone();
            session.byte_size = None;
            format!("200 Type set to {}", primary_type)
        }
        "L" => match second_arg.map(str::parse::<u8>) {
            Some(Ok(byte_size)) => {
                session.type_ = "L".to_string();
                session.byte_size = Some(byte_size);
                format!("200 Type set to L ({})", byte_size)
            }
            Some(Err(_)) => "504 Invalid byte size parameter.".to_string(),
            None => "504 Byte size parameter required for TYPE L.".to_string(),
        },
        _ => "504 Command not implemented for that parameter.".to_string(),
    };

    session.send_response(&response).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::*;

    #[tokio::test]
    async fn test_type_image() {
        let (mut session, mut client) = session_with_client(test_config()).await;
        handle_type_command(&mut session, "I".to_string()).await.unwrap();
        assert_eq!(read_reply(&mut client).await, "200 Type set to I");
        assert_eq!(session.type_, "I");
    }

    #[tokio::test]
    async fn test_type_local_byte() {
        let (mut session, mut client) = session_with_client(test_config()).await;
        handle_type_command(&mut session, "L 8".to_string()).await.unwrap();
        assert_eq!(read_reply(&mut client).await, "200 Type set to L (8)");
        assert_eq!(session.byte_size, Some(8));

        handle_type_command(&mut session, "L".to_string()).await.unwrap();
        assert!(read_reply(&mut client).await.starts_with("504"));
    }

    #[tokio::test]
    async fn test_unknown_type_keeps_previous() {
        let (mut session, mut client) = session_with_client(test_config()).await;
        handle_type_command(&mut session, "X".to_string()).await.unwrap();
        assert!(read_reply(&mut client).await.starts_with("504"));
        assert_eq!(session.type_, "A");
    }
}
