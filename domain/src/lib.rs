//! Domain logic for following a hospital matching session.
//!
//! - `status`: per-hospital display model
//! - `reconciler`: pure reducer from stream events to display state
//! - `matching`: session-start request/response bodies
//! - `gateway`: HTTP client for the matching backend
//!
//! Wire records live in the `events` crate and are re-exported here so consumers
//! of `domain` do not need to depend on it directly.

pub use events::{EventStatus, HospitalId, StatusEvent, StreamEvent};

pub mod error;
pub mod gateway;
pub mod matching;
pub mod reconciler;
pub mod status;
