//! Wire records for the hospital matching status stream.
//!
//! This crate holds the shapes that cross the network boundary and nothing else:
//!
//! - **StatusEvent**: one JSON object per SSE message on a channel-scoped stream
//! - **EventStatus**: the `status` discriminator of a `StatusEvent`
//! - **StreamEvent**: what a transport reports to the reconciler (open, message, close)
//!
//! It has no dependencies on internal crates so both the transport (`sse`) and the
//! reducer (`domain`) can depend on it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned hospital identifier, unique within a matching session.
pub type HospitalId = i64;

/// Value of the `status` field of an inbound event record.
///
/// Parsing never fails on the status itself: values this client does not know
/// about are kept as `Unknown` so newer backends can add statuses without
/// breaking older clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventStatus {
    Connected,
    Calling,
    Ringing,
    InProgress,
    Accepted,
    Rejected,
    NoAnswer,
    AllRejected,
    AiServerError,
    Unknown(String),
}

impl EventStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EventStatus::Connected => "connected",
            EventStatus::Calling => "calling",
            EventStatus::Ringing => "ringing",
            EventStatus::InProgress => "in-progress",
            EventStatus::Accepted => "accepted",
            EventStatus::Rejected => "rejected",
            EventStatus::NoAnswer => "no_answer",
            EventStatus::AllRejected => "all_rejected",
            EventStatus::AiServerError => "AI_SERVER_ERROR",
            EventStatus::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for EventStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "connected" => EventStatus::Connected,
            "calling" => EventStatus::Calling,
            "ringing" => EventStatus::Ringing,
            "in-progress" => EventStatus::InProgress,
            "accepted" => EventStatus::Accepted,
            "rejected" => EventStatus::Rejected,
            "no_answer" => EventStatus::NoAnswer,
            "all_rejected" => EventStatus::AllRejected,
            "AI_SERVER_ERROR" => EventStatus::AiServerError,
            other => EventStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for EventStatus {
    fn from(raw: String) -> Self {
        EventStatus::from(raw.as_str())
    }
}

impl From<EventStatus> for String {
    fn from(status: EventStatus) -> Self {
        match status {
            EventStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One inbound record on a matching session's status stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub status: EventStatus,
    /// Human-readable explanation. Session-level events may omit it.
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<HospitalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_number: Option<String>,
}

impl StatusEvent {
    /// Parse the `data` field of an SSE message.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Signals a stream transport hands to the reconciler.
///
/// Transports translate their own callbacks into these three events, so the
/// reducer can be driven without any real network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// The stream is live (connected, or the first item arrived after a reconnect).
    Opened,
    /// Raw `data` payload of one SSE message.
    Message(String),
    /// The transport failed or the stream ended.
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hospital_event_with_camel_case_fields() {
        let event = StatusEvent::parse(
            r#"{"status":"calling","message":"dialing","hospitalId":7,"hospitalName":"Seoul General","hospitalNumber":"02-123-4567"}"#,
        )
        .unwrap();

        assert_eq!(event.status, EventStatus::Calling);
        assert_eq!(event.message, "dialing");
        assert_eq!(event.hospital_id, Some(7));
        assert_eq!(event.hospital_name.as_deref(), Some("Seoul General"));
        assert_eq!(event.hospital_number.as_deref(), Some("02-123-4567"));
    }

    #[test]
    fn session_level_event_may_omit_message_and_hospital() {
        let event = StatusEvent::parse(r#"{"status":"all_rejected"}"#).unwrap();

        assert_eq!(event.status, EventStatus::AllRejected);
        assert_eq!(event.message, "");
        assert_eq!(event.hospital_id, None);
    }

    #[test]
    fn unrecognized_status_is_kept_rather_than_rejected() {
        let event = StatusEvent::parse(r#"{"status":"voicemail","message":"x"}"#).unwrap();

        assert_eq!(event.status, EventStatus::Unknown("voicemail".to_string()));
        assert_eq!(event.status.to_string(), "voicemail");
    }

    #[test]
    fn every_known_status_maps_back_to_its_wire_name() {
        let names = [
            "connected",
            "calling",
            "ringing",
            "in-progress",
            "accepted",
            "rejected",
            "no_answer",
            "all_rejected",
            "AI_SERVER_ERROR",
        ];

        for name in names {
            let status = EventStatus::from(name);
            assert!(
                !matches!(status, EventStatus::Unknown(_)),
                "{name} should be a known status"
            );
            assert_eq!(String::from(status), name);
        }
    }

    #[test]
    fn non_json_payload_fails_to_parse() {
        assert!(StatusEvent::parse("not json").is_err());
    }

    #[test]
    fn payload_without_status_fails_to_parse() {
        assert!(StatusEvent::parse(r#"{"message":"hello"}"#).is_err());
    }

    #[test]
    fn serializes_without_absent_optional_fields() {
        let event = StatusEvent {
            status: EventStatus::AiServerError,
            message: "timeout".to_string(),
            hospital_id: None,
            hospital_name: None,
            hospital_number: None,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "AI_SERVER_ERROR", "message": "timeout"})
        );
    }
}
