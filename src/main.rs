use clap::Parser;
use tracing_subscriber::EnvFilter;

use webforge::cli::handlers;
use webforge::cli::{Cli, Commands};
use webforge::utils::tui_writer::TuiWriter;
use webforge::{Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let filter = EnvFilter::from_default_env().add_directive("webforge=info".parse().unwrap());

    match cli.command {
        Commands::Tui => {
            // Route tracing into the TUI's log pane; raw stdout writes would
            // corrupt the alternate screen.
            let (writer, log_rx) = TuiWriter::new();
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            handlers::run_tui(config, log_rx).await
        }
        Commands::Generate { open, prompt } => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            handlers::generate(config, prompt.join(" "), open).await
        }
        Commands::List => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            handlers::list_projects(config).await
        }
        Commands::Files { folder } => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            handlers::show_files(config, folder).await
        }
        Commands::Open { folder } => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            handlers::open_project(config, folder).await
        }
    }
}
