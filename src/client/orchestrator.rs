use crate::client::gallery::ProjectGalleryStore;
use crate::client::http::ForgeClient;
use crate::client::viewer::ProjectViewerController;
use crate::core::error::SessionError;
use crate::core::session::{Completion, GenerationSession, PhaseUpdate};

/// Top-level coordinator: owns the gallery and viewer, guards against
/// re-entrant generation, and reconciles both views when a run completes.
pub struct SessionOrchestrator {
    client: ForgeClient,
    gallery: ProjectGalleryStore,
    viewer: ProjectViewerController,
    in_flight: bool,
}

impl SessionOrchestrator {
    pub fn new(client: ForgeClient) -> Self {
        SessionOrchestrator {
            client,
            gallery: ProjectGalleryStore::new(),
            viewer: ProjectViewerController::new(),
            in_flight: false,
        }
    }

    pub fn client(&self) -> &ForgeClient {
        &self.client
    }

    pub fn gallery(&self) -> &ProjectGalleryStore {
        &self.gallery
    }

    pub fn gallery_mut(&mut self) -> &mut ProjectGalleryStore {
        &mut self.gallery
    }

    pub fn viewer(&self) -> &ProjectViewerController {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut ProjectViewerController {
        &mut self.viewer
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Claim the single in-flight slot. Exactly one generation session may
    /// be unresolved at a time; a second claim fails without issuing any
    /// network request.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.in_flight {
            tracing::warn!("rejecting generation start while a session is in flight");
            return Err(SessionError::SessionInFlight);
        }
        self.in_flight = true;
        Ok(())
    }

    /// Resolve the in-flight session. On success the gallery refreshes
    /// first, so it already lists the new project when the viewer becomes
    /// visible; the viewer then activates a summary synthesized from the
    /// completion payload (it addresses the project by folder and does not
    /// need the gallery entry). On failure neither view is touched.
    pub async fn finish(
        &mut self,
        outcome: Result<Completion, SessionError>,
    ) -> Result<Completion, SessionError> {
        self.in_flight = false;

        match outcome {
            Ok(completion) => {
                if let Err(error) = self.gallery.refresh(&self.client).await {
                    tracing::warn!("gallery refresh after completion failed: {error:#}");
                }
                let summary = completion.to_summary();
                if let Err(error) = self.viewer.activate(&self.client, &summary).await {
                    tracing::warn!("viewer activation after completion failed: {error:#}");
                }
                Ok(completion)
            }
            Err(error) => {
                tracing::error!("generation session failed: {error}");
                Err(error)
            }
        }
    }

    /// Run one generation end to end: claim the slot, stream the session,
    /// then reconcile. Phase updates are relayed to `on_phase` in arrival
    /// order for live status rendering.
    pub async fn start_generation<F>(
        &mut self,
        prompt: &str,
        on_phase: F,
    ) -> Result<Completion, SessionError>
    where
        F: FnMut(&PhaseUpdate),
    {
        self.begin()?;
        let outcome = GenerationSession::start(&self.client, prompt, on_phase).await;
        self.finish(outcome).await
    }
}
