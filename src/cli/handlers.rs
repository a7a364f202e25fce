use tokio::sync::mpsc;

use crate::client::{ForgeClient, ForgeTui, ProjectGalleryStore, SessionOrchestrator};
use crate::core::project::ProjectSummary;
use crate::utils::tui_writer::LogEntry;
use crate::{Config, Result};

async fn connected_client(config: &Config) -> Result<ForgeClient> {
    let client = ForgeClient::from_config(config)?;
    if !client.is_server_running().await {
        anyhow::bail!(
            "generation backend is not reachable at {} - is the server running?",
            client.base_url()
        );
    }
    Ok(client)
}

pub async fn generate(config: Config, prompt: String, open: bool) -> Result<()> {
    let client = connected_client(&config).await?;
    let mut orchestrator = SessionOrchestrator::new(client);

    let completion = orchestrator
        .start_generation(&prompt, |update| {
            let progress = (update.progress * 100.0).round();
            match &update.details {
                Some(details) => println!("[{progress:>3}%] {} {}", update.message, details),
                None => println!("[{progress:>3}%] {}", update.message),
            }
        })
        .await?;

    // finish() already refreshed the gallery and activated the viewer.
    println!(
        "\n'{}' is ready (folder: {})",
        completion.project_name, completion.folder
    );
    if let Some(active) = orchestrator.viewer().active() {
        println!("Preview: {}", active.preview_url);
        if open {
            orchestrator.viewer().open_preview()?;
        }
    }
    Ok(())
}

pub async fn list_projects(config: Config) -> Result<()> {
    let client = connected_client(&config).await?;
    let mut gallery = ProjectGalleryStore::new();
    gallery.refresh(&client).await?;

    if gallery.is_empty() {
        println!("No projects yet. Start building!");
        return Ok(());
    }

    println!("{:<32} {:<36} {}", "NAME", "FOLDER", "CREATED");
    for project in gallery.projects() {
        let created = chrono::DateTime::from_timestamp(project.created, 0)
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<32} {:<36} {}", project.name, project.folder, created);
    }
    Ok(())
}

fn summary_for_folder(gallery: &ProjectGalleryStore, folder: &str) -> ProjectSummary {
    gallery.find(folder).cloned().unwrap_or(ProjectSummary {
        name: folder.to_string(),
        folder: folder.to_string(),
        created: 0,
    })
}

pub async fn show_files(config: Config, folder: String) -> Result<()> {
    let client = connected_client(&config).await?;
    let mut orchestrator = SessionOrchestrator::new(client.clone());
    orchestrator.gallery_mut().refresh(&client).await.ok();

    let summary = summary_for_folder(orchestrator.gallery(), &folder);
    orchestrator.viewer_mut().activate(&client, &summary).await?;

    if let Some(active) = orchestrator.viewer().active() {
        for file in &active.files {
            println!(
                "{:<24} {:<6} {:>6} bytes",
                file.name,
                file.language.as_str(),
                file.content.len()
            );
        }
    }
    Ok(())
}

pub async fn open_project(config: Config, folder: String) -> Result<()> {
    let client = connected_client(&config).await?;
    let mut orchestrator = SessionOrchestrator::new(client.clone());
    orchestrator.gallery_mut().refresh(&client).await.ok();

    let summary = summary_for_folder(orchestrator.gallery(), &folder);
    orchestrator.viewer_mut().activate(&client, &summary).await?;
    orchestrator.viewer().open_preview()?;

    if let Some(active) = orchestrator.viewer().active() {
        println!("Opened {}", active.preview_url);
    }
    Ok(())
}

pub async fn run_tui(config: Config, log_rx: mpsc::UnboundedReceiver<LogEntry>) -> Result<()> {
    let client = ForgeClient::from_config(&config)?;
    let orchestrator = SessionOrchestrator::new(client);
    let mut tui = ForgeTui::new(orchestrator)?;
    tui.run(log_rx).await
}
