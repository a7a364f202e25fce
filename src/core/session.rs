use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::client::http::ForgeClient;
use crate::core::error::SessionError;
use crate::core::event::{parse_event_line, Phase};
use crate::core::phase::{Applied, PhaseStateMachine, SessionState};
use crate::core::project::ProjectSummary;
use crate::core::stream::LineFrameDecoder;
use crate::utils::path::folder_from_project_path;

/// Snapshot handed to the phase callback once per accepted transition or
/// refresh. Callbacks are invoked synchronously in arrival order, so a UI
/// consuming them keeps a single-writer update model.
#[derive(Debug, Clone)]
pub struct PhaseUpdate {
    pub phase: Phase,
    pub state: SessionState,
    pub progress: f32,
    pub message: String,
    pub details: Option<String>,
}

/// Successful resolution of a generation session.
#[derive(Debug, Clone)]
pub struct Completion {
    pub project_name: String,
    pub folder: String,
}

impl Completion {
    /// Summary for immediate viewer activation. The payload carries no
    /// timestamp; the gallery refresh that precedes activation holds the
    /// server's value.
    pub fn to_summary(&self) -> ProjectSummary {
        ProjectSummary {
            name: self.project_name.clone(),
            folder: self.folder.clone(),
            created: 0,
        }
    }
}

/// One end-to-end generation run: opens the streaming request and drives
/// decoder -> parser -> state machine until a terminal event resolves it.
pub struct GenerationSession;

impl GenerationSession {
    pub async fn start<F>(
        client: &ForgeClient,
        prompt: &str,
        on_phase: F,
    ) -> Result<Completion, SessionError>
    where
        F: FnMut(&PhaseUpdate),
    {
        let prompt = Self::validate_prompt(prompt)?;
        let response = client.generate_stream(prompt).await?;
        Self::drive(response.bytes_stream(), on_phase).await
    }

    /// The start precondition: a prompt that is empty after trimming fails
    /// with `InvalidInput` before any network call.
    pub fn validate_prompt(prompt: &str) -> Result<&str, SessionError> {
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return Err(SessionError::InvalidInput);
        }
        Ok(trimmed)
    }

    /// Consume a chunked event stream to its terminal resolution.
    ///
    /// Malformed lines are logged and skipped; a chunk-level read error is a
    /// transport failure; a stream that ends without a terminal event is an
    /// `IncompleteStream`. Once a terminal event resolves the session the
    /// stream is dropped, releasing the connection.
    pub async fn drive<S, E, F>(chunks: S, mut on_phase: F) -> Result<Completion, SessionError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
        F: FnMut(&PhaseUpdate),
    {
        let mut chunks = chunks;
        let mut decoder = LineFrameDecoder::new();
        let mut machine = PhaseStateMachine::new();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|error| SessionError::Transport(error.to_string()))?;

            for line in decoder.push(&chunk) {
                let event = match parse_event_line(&line) {
                    Ok(event) => event,
                    Err(failure) => {
                        tracing::warn!(
                            line = %failure.line,
                            reason = %failure.reason,
                            "skipping malformed stream line"
                        );
                        continue;
                    }
                };

                // Resolve the completion payload before touching the machine
                // so a path with no usable folder segment is skipped like any
                // other malformed line instead of terminating the session.
                let completion = if event.phase == Phase::Complete {
                    let path = event.project_path.as_deref().unwrap_or_default();
                    match folder_from_project_path(path) {
                        Some(folder) => Some(Completion {
                            project_name: event.project_name.clone().unwrap_or_default(),
                            folder,
                        }),
                        None => {
                            tracing::warn!(
                                project_path = path,
                                "completion path has no folder segment, skipping line"
                            );
                            continue;
                        }
                    }
                } else {
                    None
                };

                if machine.apply(&event) == Applied::IgnoredTerminal {
                    continue;
                }

                on_phase(&PhaseUpdate {
                    phase: event.phase,
                    state: machine.state(),
                    progress: machine.progress(),
                    message: event.message.clone(),
                    details: event.details.clone(),
                });

                if let Some(completion) = completion {
                    tracing::info!(
                        project = %completion.project_name,
                        folder = %completion.folder,
                        "generation complete"
                    );
                    return Ok(completion);
                }
                if machine.state() == SessionState::Failed {
                    return Err(SessionError::Producer(event.message));
                }
            }
        }

        decoder.finish();
        Err(SessionError::IncompleteStream)
    }
}
