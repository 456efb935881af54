//! Per-hospital display state for a matching session.

use chrono::{DateTime, Utc};
use events::HospitalId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display status of one hospital call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallDisplayStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "calling")]
    Calling,
    #[serde(rename = "ringing")]
    Ringing,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "accepted")]
    Accepted,
    #[serde(rename = "rejected")]
    Rejected,
    #[serde(rename = "no_answer")]
    NoAnswer,
    #[serde(rename = "all_rejected")]
    AllRejected,
    #[serde(rename = "error")]
    Error,
}

impl CallDisplayStatus {
    /// Short label for rendering a hospital row.
    pub fn label(&self) -> &'static str {
        match self {
            CallDisplayStatus::Pending => "Waiting",
            CallDisplayStatus::Calling => "Calling...",
            CallDisplayStatus::Ringing => "Ringing",
            CallDisplayStatus::InProgress => "On the line",
            CallDisplayStatus::Accepted => "Accepted",
            CallDisplayStatus::Rejected => "Rejected",
            CallDisplayStatus::NoAnswer => "No answer",
            CallDisplayStatus::AllRejected => "All rejected",
            CallDisplayStatus::Error => "Error",
        }
    }

    /// Whether the call to this hospital has finished, one way or another.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            CallDisplayStatus::Accepted
                | CallDisplayStatus::Rejected
                | CallDisplayStatus::NoAnswer
                | CallDisplayStatus::AllRejected
                | CallDisplayStatus::Error
        )
    }
}

impl fmt::Display for CallDisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Same spelling as the serde names above.
        let name = match self {
            CallDisplayStatus::Pending => "pending",
            CallDisplayStatus::Calling => "calling",
            CallDisplayStatus::Ringing => "ringing",
            CallDisplayStatus::InProgress => "in-progress",
            CallDisplayStatus::Accepted => "accepted",
            CallDisplayStatus::Rejected => "rejected",
            CallDisplayStatus::NoAnswer => "no_answer",
            CallDisplayStatus::AllRejected => "all_rejected",
            CallDisplayStatus::Error => "error",
        };
        write!(f, "{name}")
    }
}

/// Latest known state of the call to one hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalCallStatus {
    pub hospital_id: HospitalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_number: Option<String>,
    pub status: CallDisplayStatus,
    /// Backend explanation, as sent; empty when the event carried none.
    #[serde(default)]
    pub message: String,
    /// Time of the last update to this record.
    pub timestamp: DateTime<Utc>,
}

impl HospitalCallStatus {
    /// Name to show for this hospital, falling back to its id while the backend
    /// has not revealed a name yet.
    pub fn display_name(&self) -> String {
        self.hospital_name
            .clone()
            .unwrap_or_else(|| format!("Hospital #{}", self.hospital_id))
    }
}
