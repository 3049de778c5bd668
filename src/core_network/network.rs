use crate::constants::{ACCEPT_RETRY_DELAY, REPLY_NOT_IMPLEMENTED, REPLY_TOO_MANY_SESSIONS};
use crate::core_ftpcommand::handlers::CommandTable;
use crate::core_ftpcommand::utils::split_command;
use crate::registry::{RegistryError, SessionHandle};
use crate::server::ServerContext;
use crate::session::Session;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("Session limit of {0} reached")]
    CapacityReached(usize),

    #[error("No runtime available to run the session: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Accepts control connections until `enabled` turns false.
///
/// Each accepted connection becomes a session running on its own task. A
/// connection that cannot be turned into a session is dropped and the loop
/// keeps accepting.
pub async fn start_server(
    listener: TcpListener,
    ctx: Arc<ServerContext>,
    mut enabled: watch::Receiver<bool>,
) {
    info!("Waiting for clients to connect...");

    loop {
        let keep_accepting = *enabled.borrow_and_update();
        if !keep_accepting {
            break;
        }

        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((socket, addr)) => {
                    if let Err(e) = accept_session(&ctx, socket, addr).await {
                        warn!("Discarding connection from {}: {}", addr, e);
                    }
                }
                Err(e) => {
                    warn!("Failed to accept control connection: {}", e);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
            },
            changed = enabled.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Listener loop stopped");
}

/// Creates the session for a new connection, spawns its task, and registers it.
///
/// The task only starts talking to the client once registration succeeded;
/// on any failure before that the session is dropped and its socket closed.
async fn accept_session(
    ctx: &Arc<ServerContext>,
    mut socket: TcpStream,
    addr: SocketAddr,
) -> Result<(), SpawnError> {
    let max_sessions = ctx.config.server.max_sessions;
    if ctx.registry.len().await >= max_sessions {
        let reply = format!("{}\r\n", REPLY_TOO_MANY_SESSIONS);
        if let Err(e) = socket.write_all(reply.as_bytes()).await {
            debug!("Failed to send 421 to {}: {}", addr, e);
        }
        return Err(SpawnError::CapacityReached(max_sessions));
    }

    let id = ctx.next_session_id();
    info!("New connection from {} as session {}", addr, id);
    let session = Session::new(id, socket, addr, Arc::clone(&ctx.config));

    let runtime = Handle::try_current()?;
    let (start_tx, start_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = runtime.spawn(handle_connection(session, Arc::clone(ctx), start_rx, stop_rx));

    // Dropping `start_tx` on failure makes the task exit without serving.
    ctx.registry
        .add(SessionHandle::new(id, addr, stop_tx, task))
        .await?;
    let _ = start_tx.send(());
    Ok(())
}

/// Session task entry point: serve the client, then leave the registry and
/// release the session's sockets, in that order.
pub async fn handle_connection(
    mut session: Session,
    ctx: Arc<ServerContext>,
    start: oneshot::Receiver<()>,
    mut stop: watch::Receiver<bool>,
) {
    if start.await.is_err() {
        debug!("Session {} was never registered, closing it", session.id);
        return;
    }

    if let Err(e) = run_session(&mut session, &ctx.commands, &mut stop).await {
        error!("Session {} ({}) ended on error: {}", session.id, session.peer_address, e);
    }

    let id = session.id;
    let peer = session.peer_address;
    ctx.registry.remove(id).await;
    session.release().await;
    info!("Connection closed for session {} ({})", id, peer);
}

/// Greets the client, then reads and dispatches one message per iteration
/// while the session is running.
pub async fn run_session(
    session: &mut Session,
    commands: &CommandTable,
    stop: &mut watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let banner = session.config.server.banner.clone();
    session.send_response(&banner).await?;

    while session.running {
        let n = tokio::select! {
            read = session.read_command() => read?,
            _ = stop.changed() => {
                info!("Session {} asked to stop", session.id);
                session.running = false;
                break;
            }
        };

        if n == 0 {
            info!("Client {} disconnected", session.peer_address);
            session.running = false;
            break;
        }

        let message = session.message(n).into_owned();
        let (verb, arg) = split_command(&message);
        debug!("Session {} received command: {} {}", session.id, verb, arg);

        match commands.resolve(verb) {
            Some(handler) => handler(session, arg.to_string()).await?,
            None => session.send_response(REPLY_NOT_IMPLEMENTED).await?,
        }
        debug_assert!(
            session.mode_invariant_holds(),
            "session {} left {:?} with stray data sockets",
            session.id,
            session.connection_mode()
        );

        tokio::task::yield_now().await;
    }

    Ok(())
}
