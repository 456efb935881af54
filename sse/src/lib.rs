//! Client-side Server-Sent Events (SSE) infrastructure for following a matching session.
//!
//! The backend reports the outcome of every hospital call on a stream scoped to
//! the session's channel. This crate subscribes to that stream and keeps the
//! reconciled display state current for the presentation layer.
//!
//! # Architecture
//!
//! - **Single subscription per channel**: `Manager` opens exactly one connection
//!   for the adopted channel and closes it before following another one.
//! - **Transport seam**: `Transport` turns a channel into a `Connection` that
//!   yields `StreamEvent`s (`Opened`, `Message`, `Closed`). `EventSourceTransport`
//!   is the network implementation; tests plug in in-memory transports.
//! - **Single writer**: one pump task per connection applies events to the
//!   reducer (`domain::reconciler`) and publishes `Snapshot`s over a
//!   `tokio::sync::watch` channel.
//! - **Stale writes rejected**: every write is tagged with its connection id and
//!   applied only while that connection is the active one.
//! - **No retry policy here**: reconnecting is a transport option; the reducer
//!   only sees the stream go up (`Opened`) and down (`Closed`).
//!
//! # Example: following a channel
//!
//! ```rust,ignore
//! use sse::{EventSourceTransport, Manager};
//! use std::sync::Arc;
//!
//! let mut manager = Manager::new(Arc::new(EventSourceTransport::new(&config)));
//! let mut updates = manager.subscribe();
//! manager.set_channel(Some(&response.channel))?;
//!
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow_and_update().clone();
//!     if snapshot.state.outcome().is_final() {
//!         break;
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! - `connection`: `Transport` trait, `Connection` and its `ConnectionId`
//! - `event_source`: `Transport` over `eventsource-client`
//! - `manager`: channel adoption, teardown and snapshot publishing

pub mod connection;
pub mod error;
pub mod event_source;
pub mod manager;

pub use connection::{Connection, ConnectionId, Transport};
pub use error::Error;
pub use event_source::EventSourceTransport;
pub use manager::{Manager, Snapshot};
