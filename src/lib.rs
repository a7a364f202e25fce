// WebForge Library
// Terminal client for an AI web-app generation backend

pub mod cli;
pub mod client;
pub mod core;
pub mod utils;

// Re-export commonly used types
pub use client::{ForgeClient, ProjectGalleryStore, ProjectViewerController, SessionOrchestrator};
pub use core::{
    Completion, Config, GenerationEvent, GenerationSession, Phase, PhaseStateMachine, PhaseUpdate,
    ProjectFile, ProjectSummary, SessionError, SessionState,
};

// Error handling
pub use anyhow::{Error, Result};
