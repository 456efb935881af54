use crate::connection::{Connection, ConnectionId, Transport};
use crate::error::Error;
use chrono::Utc;
use domain::reconciler::ReconcilerState;
use log::*;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What observers see: the channel being followed and its reconciled state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub channel: Option<String>,
    /// Connection whose events may still be applied; any other connection is stale.
    connection_id: Option<ConnectionId>,
    pub state: ReconcilerState,
}

struct ActiveSession {
    channel: String,
    pump: JoinHandle<()>,
}

/// Owns at most one live status subscription and the state reconciled from it.
///
/// Adopting a channel opens exactly one connection for it; adopting another
/// channel (or `None`) closes the previous one first and starts from empty
/// state. Dropping the manager closes the active connection.
pub struct Manager {
    transport: Arc<dyn Transport>,
    snapshot: Arc<watch::Sender<Snapshot>>,
    active: Option<ActiveSession>,
}

impl Manager {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (sender, _) = watch::channel(Snapshot::default());
        Self {
            transport,
            snapshot: Arc::new(sender),
            active: None,
        }
    }

    /// Receive every published snapshot from now on.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn channel(&self) -> Option<&str> {
        self.active.as_ref().map(|session| session.channel.as_str())
    }

    /// Follow `channel`, or go idle for `None`. Must be called within a tokio runtime.
    pub fn set_channel(&mut self, channel: Option<&str>) -> Result<(), Error> {
        if self.channel() == channel {
            return Ok(());
        }

        self.teardown();

        let Some(channel) = channel else {
            self.snapshot.send_replace(Snapshot::default());
            return Ok(());
        };

        let connection = match self.transport.open(channel) {
            Ok(connection) => connection,
            Err(e) => {
                warn!("Failed to open status stream for channel {channel}: {e}");
                self.snapshot.send_replace(Snapshot::default());
                return Err(e);
            }
        };

        info!(
            "Following channel {} on connection {}",
            channel,
            connection.id().as_str()
        );

        self.snapshot.send_replace(Snapshot {
            channel: Some(channel.to_string()),
            connection_id: Some(connection.id().clone()),
            state: ReconcilerState::new(),
        });

        let pump = tokio::spawn(pump(connection, Arc::clone(&self.snapshot)));

        self.active = Some(ActiveSession {
            channel: channel.to_string(),
            pump,
        });

        Ok(())
    }

    /// Stop following and discard the reconciled state.
    pub fn close(&mut self) {
        self.teardown();
        self.snapshot.send_replace(Snapshot::default());
    }

    fn teardown(&mut self) {
        if let Some(session) = self.active.take() {
            debug!("Tearing down status stream for channel {}", session.channel);
            // The pump owns the connection; aborting it drops and closes the connection.
            session.pump.abort();
        }
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Drain one connection into the shared snapshot.
///
/// Writes are applied only while the snapshot still belongs to this connection,
/// so a connection that outlives its teardown can never touch a newer session.
async fn pump(mut connection: Connection, snapshot: Arc<watch::Sender<Snapshot>>) {
    let connection_id = connection.id().clone();

    while let Some(event) = connection.recv().await {
        let mut stale = false;

        snapshot.send_if_modified(|current| {
            if current.connection_id.as_ref() != Some(&connection_id) {
                stale = true;
                return false;
            }
            current.state.apply(&event, Utc::now()).is_applied()
        });

        if stale {
            debug!(
                "Connection {} is no longer active, dropping its events",
                connection_id.as_str()
            );
            break;
        }
    }

    connection.close();
}
