//! Reconciliation of a matching session's status stream into display state.
//!
//! `ReconcilerState` is a pure reducer: transports feed it `StreamEvent`s
//! (`Opened`, `Message(payload)`, `Closed`) together with the current time, and
//! it updates the per-hospital map and the session flags. It never performs I/O,
//! never retries and never fails; bad input is absorbed and reported through the
//! returned `Outcome` so callers can log it.
//!
//! Aggregates (`matched_hospital`, `outcome`, ...) are computed on read from the
//! map and flags, never stored alongside them.

use crate::status::{CallDisplayStatus, HospitalCallStatus};
use chrono::{DateTime, Utc};
use events::{EventStatus, HospitalId, StatusEvent, StreamEvent};
use log::*;
use std::collections::BTreeMap;

/// Why an inbound event did not change the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The payload was not a status event.
    Malformed,
    /// A per-hospital status arrived without a `hospitalId`.
    MissingHospitalId,
    /// A status this client does not act on (`ringing`, `in-progress`, unknown values).
    Unhandled,
}

/// Result of applying one `StreamEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unchanged,
    Dropped(DropReason),
}

impl Outcome {
    /// Whether observers need to be notified.
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Where a matching session stands, derived from the reconciled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Nothing heard about any hospital yet.
    Waiting,
    /// Calls are under way and nobody accepted.
    InProgress,
    /// A hospital accepted the patient.
    Matched,
    /// The backend reported that every candidate hospital declined.
    AllRejected,
    /// The backend reported a fatal error.
    Failed,
}

impl SessionOutcome {
    /// Whether the session reached a state no later event is expected to change.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            SessionOutcome::Matched | SessionOutcome::AllRejected | SessionOutcome::Failed
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilerState {
    statuses: BTreeMap<HospitalId, HospitalCallStatus>,
    /// Hospital named by the most recent `accepted` event.
    last_accepted: Option<HospitalId>,
    all_rejected: bool,
    is_connected: bool,
    error: Option<String>,
}

impl ReconcilerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transport signal. `now` stamps any per-hospital record it touches.
    pub fn apply(&mut self, event: &StreamEvent, now: DateTime<Utc>) -> Outcome {
        match event {
            StreamEvent::Opened => {
                let changed = !self.is_connected || self.error.is_some();
                self.is_connected = true;
                self.error = None;
                Self::changed(changed)
            }
            StreamEvent::Closed => {
                let changed = self.is_connected;
                self.is_connected = false;
                Self::changed(changed)
            }
            StreamEvent::Message(payload) => match StatusEvent::parse(payload) {
                Ok(status_event) => self.apply_status_event(&status_event, now),
                Err(e) => {
                    warn!("Dropping malformed status event: {e}");
                    Outcome::Dropped(DropReason::Malformed)
                }
            },
        }
    }

    /// Apply an already-parsed status event.
    pub fn apply_status_event(&mut self, event: &StatusEvent, now: DateTime<Utc>) -> Outcome {
        match &event.status {
            EventStatus::Connected => {
                let changed = !self.is_connected;
                self.is_connected = true;
                Self::changed(changed)
            }
            EventStatus::Calling => self.upsert(event, CallDisplayStatus::Calling, now),
            EventStatus::Accepted => self.upsert(event, CallDisplayStatus::Accepted, now),
            EventStatus::Rejected => self.upsert(event, CallDisplayStatus::Rejected, now),
            EventStatus::NoAnswer => self.upsert(event, CallDisplayStatus::NoAnswer, now),
            EventStatus::AllRejected => {
                let changed = !self.all_rejected;
                self.all_rejected = true;
                Self::changed(changed)
            }
            EventStatus::AiServerError => {
                if self.error.as_deref() == Some(event.message.as_str()) {
                    return Outcome::Unchanged;
                }
                error!("Matching backend reported a fatal error: {}", event.message);
                self.error = Some(event.message.clone());
                Outcome::Applied
            }
            EventStatus::Ringing | EventStatus::InProgress | EventStatus::Unknown(_) => {
                debug!("Ignoring status event '{}'", event.status);
                Outcome::Dropped(DropReason::Unhandled)
            }
        }
    }

    fn upsert(
        &mut self,
        event: &StatusEvent,
        status: CallDisplayStatus,
        now: DateTime<Utc>,
    ) -> Outcome {
        let Some(hospital_id) = event.hospital_id else {
            debug!("Dropping '{}' event without a hospitalId", event.status);
            return Outcome::Dropped(DropReason::MissingHospitalId);
        };

        // Each event replaces the whole record; nothing carries over from earlier events.
        let hospital_number = match status {
            CallDisplayStatus::Calling | CallDisplayStatus::Accepted => {
                event.hospital_number.clone()
            }
            _ => None,
        };

        let entry = HospitalCallStatus {
            hospital_id,
            hospital_name: event.hospital_name.clone(),
            hospital_number,
            status,
            message: event.message.clone(),
            timestamp: now,
        };
        self.statuses.insert(hospital_id, entry);

        if status == CallDisplayStatus::Accepted {
            if let Some(other) = self.matched_hospital().map(|m| m.hospital_id) {
                if other != hospital_id {
                    warn!(
                        "Hospital {hospital_id} accepted while hospital {other} already had; keeping the latest"
                    );
                }
            }
            info!("Hospital {hospital_id} accepted the patient");
            self.last_accepted = Some(hospital_id);
        } else {
            debug!("Hospital {hospital_id} is now {status}");
        }

        Outcome::Applied
    }

    fn changed(changed: bool) -> Outcome {
        if changed {
            Outcome::Applied
        } else {
            Outcome::Unchanged
        }
    }

    /// Per-hospital records ordered by hospital id.
    pub fn statuses(&self) -> impl Iterator<Item = &HospitalCallStatus> {
        self.statuses.values()
    }

    pub fn status_of(&self, hospital_id: HospitalId) -> Option<&HospitalCallStatus> {
        self.statuses.get(&hospital_id)
    }

    pub fn hospital_count(&self) -> usize {
        self.statuses.len()
    }

    /// The hospital holding `accepted`, preferring the most recent acceptance.
    pub fn matched_hospital(&self) -> Option<&HospitalCallStatus> {
        self.last_accepted
            .and_then(|id| self.statuses.get(&id))
            .filter(|entry| entry.status == CallDisplayStatus::Accepted)
            .or_else(|| {
                self.statuses
                    .values()
                    .rev()
                    .find(|entry| entry.status == CallDisplayStatus::Accepted)
            })
    }

    pub fn all_rejected(&self) -> bool {
        self.all_rejected
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// No hospital has been heard from and the session has not ended.
    pub fn is_waiting(&self) -> bool {
        self.statuses.is_empty() && self.matched_hospital().is_none() && !self.all_rejected
    }

    pub fn outcome(&self) -> SessionOutcome {
        if self.matched_hospital().is_some() {
            SessionOutcome::Matched
        } else if self.all_rejected {
            SessionOutcome::AllRejected
        } else if self.error.is_some() {
            SessionOutcome::Failed
        } else if self.statuses.is_empty() {
            SessionOutcome::Waiting
        } else {
            SessionOutcome::InProgress
        }
    }
}
