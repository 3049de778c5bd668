use crate::config::Config;
use crate::core_ftpcommand::handlers::{initialize_command_handlers, CommandTable};
use crate::core_network::network;
use crate::registry::{SessionRegistry, StopOutcome};
use crate::session::SessionId;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

/// State shared by the listener loop and every session task.
pub struct ServerContext {
    pub config: Arc<Config>,
    pub registry: SessionRegistry,
    pub commands: CommandTable,
    session_id_counter: AtomicU64,
}

impl ServerContext {
    pub fn new(config: Arc<Config>) -> Self {
        let commands = initialize_command_handlers();
        debug!("{} FTP commands registered", commands.len());
        Self {
            config,
            registry: SessionRegistry::new(),
            commands,
            session_id_counter: AtomicU64::new(0),
        }
    }

    pub fn next_session_id(&self) -> SessionId {
        SessionId(self.session_id_counter.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// An FTP server bound to its control port.
pub struct FtpServer {
    context: Arc<ServerContext>,
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    enabled: watch::Sender<bool>,
    listener_task: Option<JoinHandle<()>>,
}

impl FtpServer {
    /// Binds the control listener. Failing to bind is the one error that
    /// prevents the server from coming up.
    pub async fn bind(config: Config) -> Result<Self> {
        config.validate()?;
        let endpoint = config.server.control_endpoint();
        let listener = TcpListener::bind(&endpoint)
            .await
            .with_context(|| format!("Failed to bind control listener on {}", endpoint))?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on {}", local_addr);

        let (enabled, _) = watch::channel(false);
        Ok(Self {
            context: Arc::new(ServerContext::new(Arc::new(config))),
            listener: Some(listener),
            local_addr,
            enabled,
            listener_task: None,
        })
    }

    /// Spawns the listener loop.
    pub fn start(&mut self) -> Result<()> {
        let listener = self
            .listener
            .take()
            .context("Server was already started")?;
        self.enabled.send_replace(true);
        let enabled = self.enabled.subscribe();
        self.listener_task = Some(tokio::spawn(network::start_server(
            listener,
            Arc::clone(&self.context),
            enabled,
        )));
        Ok(())
    }

    /// Stops accepting, then stops every session.
    ///
    /// Each session gets `shutdown_grace_ms` to leave its loop on its own
    /// before its task is aborted.
    pub async fn shutdown(&mut self) {
        self.enabled.send_replace(false);
        if let Some(task) = self.listener_task.take() {
            if let Err(e) = task.await {
                error!("Listener task failed: {}", e);
            }
        }
        self.listener = None;

        let grace = self.context.config.server.shutdown_grace();
        let handles = self.context.registry.drain().await;
        info!("Stopping {} session(s)", handles.len());

        let mut stopping = JoinSet::new();
        for handle in handles {
            stopping.spawn(async move {
                let id = handle.id();
                (id, handle.stop(grace).await)
            });
        }
        while let Some(res) = stopping.join_next().await {
            match res {
                Ok((id, StopOutcome::Graceful)) => debug!("Session {} stopped", id),
                Ok((id, StopOutcome::Forced)) => {
                    warn!("Session {} did not stop within {:?}, aborted", id, grace)
                }
                Err(e) => error!("Failed to stop a session: {}", e),
            }
        }
        info!("Server shutdown complete.");
    }

    /// Shuts down, then binds and starts again with the same configuration.
    pub async fn reset(&mut self) -> Result<()> {
        self.shutdown().await;
        let config = Config::clone(&self.context.config);
        *self = Self::bind(config).await?;
        self.start()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        *self.enabled.borrow()
    }

    pub fn context(&self) -> &Arc<ServerContext> {
        &self.context
    }

    pub async fn session_count(&self) -> usize {
        self.context.registry.len().await
    }

    pub async fn session_peers(&self) -> Vec<SocketAddr> {
        self.context.registry.peers().await
    }
}

/// Runs the FTP server until Ctrl-C, then shuts it down.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting server with config: {:?}", config);

    let mut server = FtpServer::bind(config).await?;
    server.start()?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Ctrl-C received, shutting down.");
    server.shutdown().await;
    Ok(())
}
