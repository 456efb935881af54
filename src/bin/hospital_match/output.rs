use colored::*;
use domain::matching::StartMatchingResponse;
use domain::reconciler::{ReconcilerState, SessionOutcome};
use domain::status::{CallDisplayStatus, HospitalCallStatus};
use sse::Snapshot;

pub fn print_session_started(response: &StartMatchingResponse) {
    println!(
        "{} Matching started for patient {} (channel {})",
        "✓".green(),
        response.patient_id,
        response.channel.bold()
    );

    if !response.message.is_empty() {
        println!("   {}", response.message.dimmed());
    }

    if !response.hospitals.is_empty() {
        println!("   Calling {} hospitals:", response.hospitals.len());
        for hospital in &response.hospitals {
            println!(
                "   - {} {}",
                hospital.hospital_name,
                hospital.hospital_number.dimmed()
            );
        }
    }
}

/// Prints what changed between consecutive snapshots of a followed session.
#[derive(Default)]
pub struct Renderer {
    last: Option<ReconcilerState>,
}

impl Renderer {
    pub fn render(&mut self, snapshot: &Snapshot) {
        for line in self.changes(&snapshot.state) {
            println!("{line}");
        }
        self.last = Some(snapshot.state.clone());
    }

    fn changes(&self, state: &ReconcilerState) -> Vec<String> {
        let previous = self.last.as_ref();
        let mut lines = Vec::new();

        let was_connected = previous.is_some_and(|p| p.is_connected());
        if state.is_connected() != was_connected {
            lines.push(connection_line(state.is_connected()));
        }

        for entry in state.statuses() {
            let before = previous.and_then(|p| p.status_of(entry.hospital_id));
            if before != Some(entry) {
                lines.push(hospital_line(entry));
            }
        }

        if let Some(error) = state.error() {
            if previous.and_then(|p| p.error()) != Some(error) {
                lines.push(format!(
                    "\n{} {}",
                    "AI server error:".bright_red().bold(),
                    error
                ));
            }
        }

        let was_matched = previous.and_then(|p| p.matched_hospital().map(|m| m.hospital_id));
        if let Some(matched) = state.matched_hospital() {
            if was_matched != Some(matched.hospital_id) {
                lines.push(matched_banner(matched));
            }
        } else if state.all_rejected() && !previous.is_some_and(|p| p.all_rejected()) {
            lines.push(format!(
                "\n{}",
                "No nearby hospital can take the patient.".bright_red().bold()
            ));
        }

        lines
    }
}

fn connection_line(connected: bool) -> String {
    if connected {
        format!("{} Stream connected", "●".green())
    } else {
        format!("{} Stream connection unstable", "●".yellow())
    }
}

fn status_tag(status: CallDisplayStatus) -> ColoredString {
    let tag = format!("[{}]", status.label());
    match status {
        CallDisplayStatus::Calling | CallDisplayStatus::Ringing | CallDisplayStatus::InProgress => {
            tag.bright_blue()
        }
        CallDisplayStatus::Accepted => tag.green().bold(),
        CallDisplayStatus::Rejected | CallDisplayStatus::AllRejected | CallDisplayStatus::Error => {
            tag.red()
        }
        CallDisplayStatus::NoAnswer => tag.yellow(),
        CallDisplayStatus::Pending => tag.dimmed(),
    }
}

fn hospital_line(entry: &HospitalCallStatus) -> String {
    let mut line = format!("{} {}", status_tag(entry.status), entry.display_name());

    if let Some(number) = &entry.hospital_number {
        line.push_str(&format!(" {}", number.dimmed()));
    }
    if !entry.message.is_empty() {
        line.push_str(&format!("\n      {}", entry.message.dimmed()));
    }

    line
}

fn matched_banner(matched: &HospitalCallStatus) -> String {
    let number = matched
        .hospital_number
        .clone()
        .unwrap_or_else(|| "no phone number available".to_string());
    let message = if matched.message.is_empty() {
        "Ready to receive the patient. Transport now."
    } else {
        matched.message.as_str()
    };

    format!(
        "\n{} {}\n   {}\n   {}",
        "Transfer confirmed:".bright_green().bold(),
        matched.display_name().bold(),
        number,
        message.dimmed()
    )
}

pub fn print_summary(state: &ReconcilerState) {
    println!("\n{}", "=== SESSION SUMMARY ===".bright_white().bold());

    let (settled, total) = call_counts(state);
    println!("{settled} of {total} hospital calls finished");

    for entry in state.statuses() {
        println!(
            "{} {} ({})",
            status_tag(entry.status),
            entry.display_name(),
            entry.timestamp.to_rfc3339()
        );
    }

    let outcome = match state.outcome() {
        SessionOutcome::Matched => "Matched".bright_green().bold(),
        SessionOutcome::AllRejected => "All hospitals declined".bright_red().bold(),
        SessionOutcome::Failed => "Failed".bright_red().bold(),
        SessionOutcome::InProgress => "Still in progress".yellow().bold(),
        SessionOutcome::Waiting => "No hospital reported yet".yellow().bold(),
    };
    println!("\n{}: {}", "Outcome".bold(), outcome);
}

/// Calls that reached a final answer, out of all hospitals heard from.
fn call_counts(state: &ReconcilerState) -> (usize, usize) {
    let settled = state.statuses().filter(|s| s.status.is_settled()).count();
    (settled, state.hospital_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domain::StreamEvent;

    fn apply(state: &mut ReconcilerState, json: &str) {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap();
        state.apply(&StreamEvent::Message(json.to_string()), now);
    }

    fn rendered(renderer: &mut Renderer, state: &ReconcilerState) -> Vec<String> {
        colored::control::set_override(false);
        let lines = renderer.changes(state);
        renderer.last = Some(state.clone());
        lines
    }

    #[test]
    fn only_changed_hospitals_are_rendered() {
        let mut renderer = Renderer::default();
        let mut state = ReconcilerState::new();
        apply(&mut state, r#"{"status":"calling","hospitalId":1,"hospitalName":"A"}"#);
        apply(&mut state, r#"{"status":"calling","hospitalId":2,"hospitalName":"B"}"#);
        assert_eq!(rendered(&mut renderer, &state).len(), 2);

        apply(
            &mut state,
            r#"{"status":"rejected","hospitalId":2,"hospitalName":"B","message":"full"}"#,
        );
        let lines = rendered(&mut renderer, &state);

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[Rejected] B"));
        assert!(lines[0].contains("full"));
    }

    #[test]
    fn matched_banner_is_rendered_once() {
        let mut renderer = Renderer::default();
        let mut state = ReconcilerState::new();
        apply(
            &mut state,
            r#"{"status":"accepted","hospitalId":3,"hospitalName":"C","hospitalNumber":"02-3"}"#,
        );

        let lines = rendered(&mut renderer, &state);
        assert!(lines.iter().any(|l| l.contains("Transfer confirmed: C")));

        assert!(rendered(&mut renderer, &state).is_empty());
    }

    #[test]
    fn all_rejected_and_error_banners() {
        let mut renderer = Renderer::default();
        let mut state = ReconcilerState::new();
        apply(&mut state, r#"{"status":"all_rejected"}"#);
        apply(&mut state, r#"{"status":"AI_SERVER_ERROR","message":"timeout"}"#);

        let lines = rendered(&mut renderer, &state);

        assert!(lines.iter().any(|l| l.contains("No nearby hospital")));
        assert!(lines.iter().any(|l| l.contains("AI server error: timeout")));
    }

    #[test]
    fn summary_counts_only_answered_calls() {
        let mut state = ReconcilerState::new();
        apply(&mut state, r#"{"status":"calling","hospitalId":1}"#);
        apply(&mut state, r#"{"status":"rejected","hospitalId":2}"#);
        apply(&mut state, r#"{"status":"no_answer","hospitalId":3}"#);

        assert_eq!(call_counts(&state), (2, 3));
    }

    #[test]
    fn connection_changes_are_rendered() {
        let mut renderer = Renderer::default();
        let mut state = ReconcilerState::new();
        assert!(rendered(&mut renderer, &state).is_empty());

        state.apply(&StreamEvent::Opened, Utc::now());
        let lines = rendered(&mut renderer, &state);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Stream connected"));

        state.apply(&StreamEvent::Closed, Utc::now());
        assert!(rendered(&mut renderer, &state)[0].contains("unstable"));
    }
}
