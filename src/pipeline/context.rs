//! Shared, read-only dependencies of the phase executors

use std::sync::Arc;

use crate::config::{ModelConfig, ModelTable};
use crate::llm::{ChatMessage, LLMClient, LLMRequest, PhaseClients};
use crate::progress::{NoOpHandler, ProgressHandler};
use crate::project::ProjectSnapshot;

use super::config::PipelineConfig;
use super::PhaseId;

/// Context that owns all long-lived pipeline dependencies
#[derive(Clone)]
pub struct PhaseContext {
    pub clients: PhaseClients,
    pub models: Arc<ModelTable>,
    pub config: PipelineConfig,
    pub project: Arc<ProjectSnapshot>,
    pub progress: Arc<dyn ProgressHandler>,
}

impl PhaseContext {
    pub fn new(
        clients: PhaseClients,
        models: ModelTable,
        config: PipelineConfig,
        project: ProjectSnapshot,
    ) -> Self {
        Self {
            clients,
            models: Arc::new(models),
            config,
            project: Arc::new(project),
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn client(&self, phase: PhaseId) -> Option<Arc<dyn LLMClient>> {
        self.clients.get(phase)
    }

    pub fn model(&self, phase: PhaseId) -> &ModelConfig {
        self.models.get(phase)
    }

    /// System + user request carrying the phase's model settings
    pub fn request(&self, phase: PhaseId, system: String, user: String) -> LLMRequest {
        let model = self.model(phase);
        let mut request = LLMRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)])
            .with_max_tokens(model.max_tokens.unwrap_or(self.config.max_tokens))
            .with_reasoning(model.reasoning);
        if let Some(temperature) = model.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }
}
