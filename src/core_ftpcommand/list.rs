use crate::core_ftpcommand::utils::{confine_path, resolve_path};
use crate::core_network::{ConnectionMode, DataChannelError};
use crate::session::Session;
use chrono::{DateTime, Local};
use log::{error, info, warn};
use std::fs::Metadata;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Handles the LIST FTP command.
///
/// Sends an `ls -l` style listing over the data channel negotiated with PASV,
/// then closes that channel. Lists the working directory, or the directory
/// named by the argument. Option-style arguments (`-la`) are ignored.
pub async fn handle_list_command(session: &mut Session, arg: String) -> Result<(), std::io::Error> {
    if session.connection_mode() == ConnectionMode::None {
        let response = DataChannelError::NotConfigured.to_ftp_response();
        return session.send_response(&response).await;
    }

    let virtual_dir = match arg.trim() {
        "" => session.current_dir.clone(),
        target if target.starts_with('-') => session.current_dir.clone(),
        target => resolve_path(&session.current_dir, target),
    };

    let dir_path = match confine_path(&session.config, &virtual_dir).await {
        Ok(path) => path,
        Err(e) => {
            warn!("Session {}: refusing to list {}: {}", session.id, virtual_dir, e);
            session.close_data();
            return session.send_response("550 Failed to list directory.").await;
        }
    };
    info!("Listing {:?} for session {}", dir_path, session.id);

    let listing = match read_listing(&dir_path).await {
        Ok(listing) => listing,
        Err(e) => {
            error!("Error reading directory {:?}: {}", dir_path, e);
            session.close_data();
            return session.send_response("550 Failed to list directory.").await;
        }
    };

    session
        .send_response("150 Here comes the directory listing.")
        .await?;

    if let Err(e) = session.accept_data().await {
        error!("Session {}: {}", session.id, e);
        session.close_data();
        return session.send_response(&e.to_ftp_response()).await;
    }

    let sent = match session.data_stream_mut() {
        Some(data_stream) => match data_stream.write_all(listing.as_bytes()).await {
            Ok(()) => {
                if let Err(e) = data_stream.shutdown().await {
                    warn!("Failed to shutdown data stream: {:?}", e);
                }
                Ok(())
            }
            Err(e) => Err(DataChannelError::Transfer(e)),
        },
        None => Err(DataChannelError::NotConnected),
    };
    session.close_data();

    match sent {
        Ok(()) => {
            info!("Directory listing sent successfully.");
            session.send_response("226 Directory send OK.").await
        }
        Err(DataChannelError::NotConnected) => {
            session
                .send_response(&DataChannelError::NotConnected.to_ftp_response())
                .await
        }
        Err(e) => {
            error!("Failed to send directory listing: {}", e);
            session
                .send_response("426 Connection closed; transfer aborted.")
                .await
        }
    }
}

async fn read_listing(dir_path: &Path) -> Result<String, std::io::Error> {
    let mut entries = tokio::fs::read_dir(dir_path).await?;
    let mut lines = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(
                    "Failed to get metadata for entry: {:?}, error: {:?}",
                    entry.path(),
                    e
                );
                continue;
            }
        };
        let file_name = entry.file_name().to_string_lossy().into_owned();
        lines.push((file_name.clone(), format_entry(&file_name, &metadata)));
    }

    lines.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(lines.into_iter().map(|(_, line)| line).collect())
}

fn format_entry(file_name: &str, metadata: &Metadata) -> String {
    let file_type = if metadata.is_dir() { "d" } else { "-" };
    let modified: DateTime<Local> = metadata
        .modified()
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now());

    format!(
        "{}rwxr-xr-x 1 owner group {} {} {}\r\n",
        file_type,
        metadata.len(),
        modified.format("%b %d %H:%M"),
        file_name
    )
}
