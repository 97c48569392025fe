//! Text produced when a session ends.

use super::events::{EventKind, EventLog};
use crate::format::format_clock;

/// Contents of every note, one per line, in log order
pub fn note_summary(log: &EventLog) -> String {
    log.of_kind(EventKind::Note)
        .map(|e| e.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain-text session report with counts and a full timeline.
///
/// ```text
/// Session Summary - 00:02:05
///
/// Events: 1
/// Combat Encounters: 1
/// Notes: 1
///
/// Timeline:
/// [00:00:00] Session started
/// ```
pub fn session_report(log: &EventLog, elapsed_seconds: u64) -> String {
    let mut lines = vec![
        format!("Session Summary - {}", format_clock(elapsed_seconds)),
        String::new(),
        format!("Events: {}", log.count(EventKind::Event)),
        format!("Combat Encounters: {}", log.count(EventKind::Combat)),
        format!("Notes: {}", log.count(EventKind::Note)),
        String::new(),
        "Timeline:".to_string(),
    ];

    lines.extend(
        log.events()
            .iter()
            .map(|e| format!("[{}] {}", format_clock(e.timestamp_seconds), e.content)),
    );

    lines.join("\n")
}

/// Append a report to existing session notes, separated by a blank line
pub fn append_notes(existing: &str, report: &str) -> String {
    if existing.is_empty() {
        report.to_string()
    } else {
        format!("{}\n\n{}", existing, report)
    }
}
