use thiserror::Error;

/// Ways a generation session can fail.
///
/// Per-line parse failures are deliberately absent: a malformed line is
/// logged and skipped, and only surfaces as [`SessionError::IncompleteStream`]
/// if the stream never reaches a terminal event.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The prompt was empty after trimming; rejected before any I/O.
    #[error("prompt must not be empty")]
    InvalidInput,

    /// A previous session has not resolved yet; no request was issued.
    #[error("a generation session is already in flight")]
    SessionInFlight,

    /// Connect failure, non-success response, or a failed chunk read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The stream closed without ever producing a terminal event.
    #[error("stream ended before the generation finished")]
    IncompleteStream,

    /// The producer reported an explicit error phase.
    #[error("generation failed: {0}")]
    Producer(String),
}
