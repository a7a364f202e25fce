use anyhow::{Context, Result};
use url::Url;

use crate::client::http::ForgeClient;
use crate::core::project::{ProjectFile, ProjectSummary};

/// The single activated project: its summary, freshly fetched files in tab
/// order, the selected tab, and the cache-busted preview locator.
pub struct ActiveProject {
    pub summary: ProjectSummary,
    pub files: Vec<ProjectFile>,
    pub selected_tab: usize,
    pub preview_url: Url,
}

/// Owns activation state for the project viewer. At most one project is
/// active; activating another silently supersedes it.
#[derive(Default)]
pub struct ProjectViewerController {
    active: Option<ActiveProject>,
    /// Monotonic cache-bust token; bumped on every activation and manual
    /// preview refresh so the browser never serves stale content.
    cache_bust: u64,
}

impl ProjectViewerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveProject> {
        self.active.as_ref()
    }

    pub fn cache_bust_token(&self) -> u64 {
        self.cache_bust
    }

    /// Make `project` the viewer's subject: fetch its files, order the tabs,
    /// select the first, and rebuild the preview locator with a fresh token.
    ///
    /// The fetch happens before any state changes, so a failed listing
    /// leaves the previously active project (if any) untouched.
    pub async fn activate(&mut self, client: &ForgeClient, project: &ProjectSummary) -> Result<()> {
        let mut files = client
            .project_files(&project.folder)
            .await
            .with_context(|| format!("failed to activate '{}'", project.folder))?;

        // Fixed tab priority html < css < js < other; stable sort keeps the
        // server's order within each class.
        files.sort_by_key(|file| file.language);

        self.cache_bust += 1;
        let preview_url = preview_url(client, &project.folder, self.cache_bust);

        tracing::info!(folder = %project.folder, files = files.len(), "project activated");
        self.active = Some(ActiveProject {
            summary: project.clone(),
            files,
            selected_tab: 0,
            preview_url,
        });
        Ok(())
    }

    /// Re-point the preview at the same project under a fresh token. No-op
    /// when nothing is active.
    pub fn refresh_preview(&mut self, client: &ForgeClient) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        self.cache_bust += 1;
        active.preview_url = preview_url(client, &active.summary.folder, self.cache_bust);
    }

    /// Clear the activation and blank the preview reference so any embedded
    /// media stops.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(folder = %active.summary.folder, "viewer closed");
        }
    }

    /// Hand the preview locator to the OS browser.
    pub fn open_preview(&self) -> Result<()> {
        let Some(active) = self.active.as_ref() else {
            anyhow::bail!("no project is active");
        };
        open::that(active.preview_url.as_str())
            .with_context(|| format!("failed to open {}", active.preview_url))
    }

    pub fn select_tab(&mut self, index: usize) {
        if let Some(active) = self.active.as_mut() {
            if index < active.files.len() {
                active.selected_tab = index;
            }
        }
    }

    pub fn next_tab(&mut self) {
        if let Some(active) = self.active.as_mut() {
            if !active.files.is_empty() {
                active.selected_tab = (active.selected_tab + 1) % active.files.len();
            }
        }
    }

    pub fn prev_tab(&mut self) {
        if let Some(active) = self.active.as_mut() {
            if !active.files.is_empty() {
                active.selected_tab =
                    (active.selected_tab + active.files.len() - 1) % active.files.len();
            }
        }
    }

    pub fn selected_file(&self) -> Option<&ProjectFile> {
        let active = self.active.as_ref()?;
        active.files.get(active.selected_tab)
    }
}

fn preview_url(client: &ForgeClient, folder: &str, token: u64) -> Url {
    let mut url = client.project_url(folder);
    url.set_query(Some(&format!("t={}", token)));
    url
}
