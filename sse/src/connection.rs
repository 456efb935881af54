use crate::error::Error;
use domain::StreamEvent;
use log::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Unique identifier for a connection (client-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opens channel-scoped status streams.
///
/// Implementations translate their own callbacks into `StreamEvent`s and hand
/// them over through the returned `Connection`.
pub trait Transport: Send + Sync {
    fn open(&self, channel: &str) -> Result<Connection, Error>;
}

/// One live subscription to a channel's status stream.
///
/// The connection is closed exactly once: explicitly through `close`, or when it
/// is dropped. After closing, `recv` yields nothing more and the producing task
/// (if any) is aborted.
pub struct Connection {
    id: ConnectionId,
    channel: String,
    events: UnboundedReceiver<StreamEvent>,
    task: Option<JoinHandle<()>>,
    closed: bool,
}

impl Connection {
    /// Wrap a receiver of stream events. `task` is the producer to abort on close,
    /// if the transport runs one.
    pub fn new(
        channel: String,
        events: UnboundedReceiver<StreamEvent>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            channel,
            events,
            task,
            closed: false,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next event from the stream, or `None` once the stream ended or was closed.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        if self.closed {
            return None;
        }
        self.events.recv().await
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.events.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        info!(
            "Closed status stream connection {} for channel {}",
            self.id.as_str(),
            self.channel
        );
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
