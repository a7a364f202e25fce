pub mod path;
pub mod tui_writer;

pub use path::folder_from_project_path;
pub use tui_writer::{LogEntry, LogLevel, TuiWriter};
