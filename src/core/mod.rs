pub mod config;
pub mod error;
pub mod event;
pub mod phase;
pub mod project;
pub mod session;
pub mod stream;

pub use config::Config;
pub use error::SessionError;
pub use event::{parse_event_line, GenerationEvent, ParseFailure, Phase};
pub use phase::{Applied, PhaseStateMachine, SessionState};
pub use project::{FileLanguage, ProjectFile, ProjectSummary};
pub use session::{Completion, GenerationSession, PhaseUpdate};
pub use stream::LineFrameDecoder;
