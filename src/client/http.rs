use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::core::error::SessionError;
use crate::core::project::{ProjectFile, ProjectSummary};
use crate::core::Config;

/// HTTP surface of the generation backend: the streaming generation
/// endpoint, project history, per-project file listings, and preview URLs.
#[derive(Debug, Clone)]
pub struct ForgeClient {
    base_url: Url,
    client: Client,
    request_timeout: Duration,
    recursion_limit: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    recursion_limit: u32,
}

impl ForgeClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, 30, 100)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::build(
            &config.server.base_url,
            config.server.request_timeout_secs,
            config.generation.recursion_limit,
        )
    }

    fn build(base_url: &str, request_timeout_secs: u64, recursion_limit: u32) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|error| anyhow!("invalid server base URL '{}': {}", base_url, error))?;

        // No client-level total timeout: the streaming generation request
        // legitimately runs for minutes. The non-streaming endpoints get a
        // per-request deadline instead.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|error| anyhow!("failed to create HTTP client: {}", error))?;

        Ok(ForgeClient {
            base_url,
            client,
            request_timeout: Duration::from_secs(request_timeout_secs),
            recursion_limit,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    /// Check whether the backend answers at all.
    pub async fn is_server_running(&self) -> bool {
        self.client
            .get(self.endpoint("/history"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .is_ok()
    }

    /// Open the streaming generation request and return the live response.
    pub async fn generate_stream(&self, prompt: &str) -> Result<reqwest::Response, SessionError> {
        let request = GenerateRequest {
            prompt,
            recursion_limit: self.recursion_limit,
        };
        let url = self.endpoint("/generate-stream");
        tracing::debug!(%url, "opening generation stream");

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|error| SessionError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            tracing::error!(%status, detail, "generation request rejected");
            return Err(SessionError::Transport(format!(
                "generation request failed: {} - {}",
                status, detail
            )));
        }

        Ok(response)
    }

    /// Fetch the full project history, server order preserved.
    pub async fn history(&self) -> Result<Vec<ProjectSummary>> {
        let response = self
            .client
            .get(self.endpoint("/history"))
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("failed to fetch history: {}", response.status()));
        }

        let response_text = response.text().await?;
        let projects: Vec<ProjectSummary> = serde_json::from_str(&response_text)
            .map_err(|error| anyhow!("failed to parse history response: {}", error))?;
        tracing::debug!(count = projects.len(), "fetched project history");
        Ok(projects)
    }

    /// Fetch the file listing of one project.
    pub async fn project_files(&self, folder: &str) -> Result<Vec<ProjectFile>> {
        let mut url = self.endpoint("/project-files");
        url.query_pairs_mut().append_pair("folder", folder);

        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to fetch files for '{}': {}",
                folder,
                response.status()
            ));
        }

        let response_text = response.text().await?;
        let files: Vec<ProjectFile> = serde_json::from_str(&response_text)
            .map_err(|error| anyhow!("failed to parse file listing: {}", error))?;
        Ok(files)
    }

    /// Address of a project's entry document. Cache-busting is the viewer's
    /// concern; this is the stable per-project locator.
    pub fn project_url(&self, folder: &str) -> Url {
        self.endpoint(&format!("/projects/{}/index.html", folder))
    }
}
