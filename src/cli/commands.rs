use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "webforge")]
#[command(about = "Terminal client for an AI web-app generation backend", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new project from a description
    Generate {
        /// Open the preview in the browser when the build finishes
        #[arg(short, long)]
        open: bool,
        /// Description of the app to build
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
    },
    /// List generated projects
    List,
    /// Show a project's files in tab order
    Files {
        /// Project folder identifier
        folder: String,
    },
    /// Open a project's preview in the browser
    Open {
        /// Project folder identifier
        folder: String,
    },
    /// Launch the interactive terminal UI
    Tui,
}
