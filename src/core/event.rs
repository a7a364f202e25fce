use serde::{Deserialize, Serialize};

/// One stage of a generation run as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Planning,
    Architect,
    Coding,
    Complete,
    Error,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Planning => "planning",
            Phase::Architect => "architect",
            Phase::Coding => "coding",
            Phase::Complete => "complete",
            Phase::Error => "error",
        }
    }
}

/// One record of the newline-delimited generation stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationEvent {
    pub phase: Phase,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

/// A line that could not be decoded into a protocol event. Non-fatal: the
/// backend may interleave diagnostic lines with protocol records.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub line: String,
    pub reason: String,
}

/// Decode one complete line into a [`GenerationEvent`].
///
/// Rejected as malformed: structurally invalid JSON, a phase outside the
/// closed set, a missing `message`, or a `complete` event without both a
/// non-empty `project_path` and `project_name` (a completion with an empty
/// identifier must never reach the viewer).
pub fn parse_event_line(line: &str) -> Result<GenerationEvent, ParseFailure> {
    let event: GenerationEvent = serde_json::from_str(line).map_err(|error| ParseFailure {
        line: line.to_string(),
        reason: error.to_string(),
    })?;

    if event.phase == Phase::Complete {
        let has_path = event
            .project_path
            .as_deref()
            .is_some_and(|path| !path.trim().is_empty());
        let has_name = event
            .project_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if !has_path || !has_name {
            return Err(ParseFailure {
                line: line.to_string(),
                reason: "complete event missing project_path or project_name".to_string(),
            });
        }
    }

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intermediate_event() {
        let event =
            parse_event_line(r#"{"phase":"planning","message":"Drafting engineering plan..."}"#)
                .unwrap();
        assert_eq!(event.phase, Phase::Planning);
        assert_eq!(event.message, "Drafting engineering plan...");
        assert!(event.details.is_none());
    }

    #[test]
    fn test_parse_details_passthrough() {
        let event = parse_event_line(
            r#"{"phase":"coding","message":"Writing code (2/5)...","details":"Task: app.js"}"#,
        )
        .unwrap();
        assert_eq!(event.details.as_deref(), Some("Task: app.js"));
    }

    #[test]
    fn test_unknown_phase_is_parse_failure() {
        // Valid JSON, but "bogus" is outside the closed phase set.
        let failure = parse_event_line(r#"{"phase":"bogus","message":"hi"}"#).unwrap_err();
        assert!(failure.line.contains("bogus"));
    }

    #[test]
    fn test_missing_message_is_parse_failure() {
        assert!(parse_event_line(r#"{"phase":"planning"}"#).is_err());
    }

    #[test]
    fn test_complete_requires_project_fields() {
        let missing_path = r#"{"phase":"complete","message":"Done","project_name":"Todo App"}"#;
        assert!(parse_event_line(missing_path).is_err());

        let missing_name = r#"{"phase":"complete","message":"Done","project_path":"/out/x/"}"#;
        assert!(parse_event_line(missing_name).is_err());

        let empty_path = r#"{"phase":"complete","message":"Done","project_path":"  ","project_name":"Todo App"}"#;
        assert!(parse_event_line(empty_path).is_err());

        let complete = r#"{"phase":"complete","message":"Done","project_path":"/out/todo-app-1/","project_name":"Todo App"}"#;
        let event = parse_event_line(complete).unwrap();
        assert_eq!(event.project_name.as_deref(), Some("Todo App"));
    }

    #[test]
    fn test_non_json_line_is_parse_failure() {
        assert!(parse_event_line("INFO: compiling step 3").is_err());
    }
}
