use anyhow::{Context, Result};

use crate::client::http::ForgeClient;
use crate::core::project::ProjectSummary;

/// The list of known projects. Refreshes replace the collection wholesale;
/// a failed fetch must never clear a previously rendered gallery.
#[derive(Default)]
pub struct ProjectGalleryStore {
    projects: Vec<ProjectSummary>,
}

impl ProjectGalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view in server order; the store imposes no sort of its own.
    pub fn projects(&self) -> &[ProjectSummary] {
        &self.projects
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn find(&self, folder: &str) -> Option<&ProjectSummary> {
        self.projects.iter().find(|project| project.folder == folder)
    }

    /// Replace the collection with a fresh fetch. The old list stays visible
    /// until the new one is fully fetched and parsed; on any failure the
    /// previous list is left untouched and the error is returned.
    pub async fn refresh(&mut self, client: &ForgeClient) -> Result<()> {
        let fresh = client
            .history()
            .await
            .context("gallery refresh failed")?;
        tracing::debug!(count = fresh.len(), "gallery refreshed");
        self.projects = fresh;
        Ok(())
    }
}
