pub mod gallery;
pub mod http;
pub mod orchestrator;
pub mod tui;
pub mod viewer;

pub use gallery::ProjectGalleryStore;
pub use http::ForgeClient;
pub use orchestrator::SessionOrchestrator;
pub use tui::ForgeTui;
pub use viewer::{ActiveProject, ProjectViewerController};
