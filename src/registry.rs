//! Registry of live sessions.
//!
//! Holds one [`SessionHandle`] per running session loop. The handle is opaque:
//! it lets the server enumerate sessions and stop them, but never reach into a
//! session's own state, which stays with the task that owns it.

use crate::session::SessionId;
use log::debug;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Session {0} is already registered")]
    AlreadyRegistered(SessionId),
}

/// How a session task ended when the server asked it to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Graceful,
    Forced,
}

#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    peer: SocketAddr,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn new(id: SessionId, peer: SocketAddr, stop: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
        Self {
            id,
            peer,
            stop,
            task,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Asks the session loop to leave at its next suspension point.
    pub fn request_stop(&self) {
        // The receiver is gone once the task finished, nothing to signal then.
        let _ = self.stop.send(true);
    }

    /// Requests a stop, waits up to `grace` for the task, then aborts it.
    ///
    /// Aborting drops the session future and with it every socket it owns.
    pub async fn stop(mut self, grace: Duration) -> StopOutcome {
        self.request_stop();
        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(_) => StopOutcome::Graceful,
            Err(_) => {
                self.task.abort();
                let _ = (&mut self.task).await;
                StopOutcome::Forced
            }
        }
    }
}

/// Mutex-guarded map of session handles. The lock is only held for map
/// updates, never across socket I/O.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, handle: SessionHandle) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&handle.id) {
            return Err(RegistryError::AlreadyRegistered(handle.id));
        }
        debug!("Registering session {} ({})", handle.id, handle.peer);
        sessions.insert(handle.id, handle);
        Ok(())
    }

    pub async fn remove(&self, id: SessionId) -> Option<SessionHandle> {
        let removed = self.sessions.lock().await.remove(&id);
        if removed.is_some() {
            debug!("Unregistered session {}", id);
        }
        removed
    }

    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    pub async fn peers(&self) -> Vec<SocketAddr> {
        self.sessions
            .lock()
            .await
            .values()
            .map(SessionHandle::peer)
            .collect()
    }

    /// Empties the registry and hands every handle to the caller.
    pub async fn drain(&self) -> Vec<SessionHandle> {
        self.sessions
            .lock()
            .await
            .drain()
            .map(|(_, handle)| handle)
            .collect()
    }
}
