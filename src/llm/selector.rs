use crate::config::{ModelConfig, ModelTable};
use crate::llm::{GenAIClient, LLMClient, Provider, RecordingLLMClient, RecordingMode};
use crate::pipeline::PhaseId;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Record/replay settings applied to every client built by the selector
#[derive(Debug, Clone)]
pub struct RecordingSettings {
    pub mode: RecordingMode,
    pub dir: PathBuf,
}

/// One client per phase, shared read-only across tasks
#[derive(Clone)]
pub struct PhaseClients {
    clients: HashMap<PhaseId, Arc<dyn LLMClient>>,
}

impl PhaseClients {
    /// Uses the same client for every phase
    pub fn uniform(client: Arc<dyn LLMClient>) -> Self {
        Self {
            clients: PhaseId::ALL
                .into_iter()
                .map(|phase| (phase, Arc::clone(&client)))
                .collect(),
        }
    }

    pub fn with_client(mut self, phase: PhaseId, client: Arc<dyn LLMClient>) -> Self {
        self.clients.insert(phase, client);
        self
    }

    pub fn get(&self, phase: PhaseId) -> Option<Arc<dyn LLMClient>> {
        self.clients.get(&phase).cloned()
    }
}

impl std::fmt::Debug for PhaseClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self
            .clients
            .iter()
            .map(|(phase, client)| (phase.key(), client.name().to_string()))
            .collect();
        names.sort();
        f.debug_struct("PhaseClients").field("clients", &names).finish()
    }
}

/// Builds the clients for a model table
///
/// Phases that share a provider and model share one client instance.
pub fn select_phase_clients(
    table: &ModelTable,
    recording: Option<&RecordingSettings>,
) -> Result<PhaseClients> {
    let mut cache: HashMap<(Provider, String), Arc<dyn LLMClient>> = HashMap::new();
    let mut clients = HashMap::new();

    for (phase, config) in table.iter() {
        let key = (config.provider, config.model.clone());
        let client = match cache.get(&key) {
            Some(client) => Arc::clone(client),
            None => {
                let client = build_client(config, recording)
                    .with_context(|| format!("Failed to create client for {}", phase.key()))?;
                cache.insert(key, Arc::clone(&client));
                client
            }
        };
        debug!(phase = %phase.key(), model = %config, "Selected client");
        clients.insert(phase, client);
    }

    info!(
        "Initialized {} LLM client(s) for {} phases",
        cache.len(),
        clients.len()
    );
    Ok(PhaseClients { clients })
}

fn build_client(
    config: &ModelConfig,
    recording: Option<&RecordingSettings>,
) -> Result<Arc<dyn LLMClient>> {
    let client: Arc<dyn LLMClient> = Arc::new(GenAIClient::new(config.provider, &config.model)?);

    let Some(settings) = recording else {
        return Ok(client);
    };

    let mut recorder = RecordingLLMClient::new(client, settings.mode, settings.dir.clone())?;
    if settings.mode != RecordingMode::Record {
        recorder.preload_cache()?;
    }
    debug!(mode = ?settings.mode, dir = %settings.dir.display(), "Wrapped client with recorder");
    Ok(Arc::new(recorder))
}

/// Check if Ollama is running locally
pub async fn is_ollama_available() -> bool {
    let base_url =
        std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string());

    let url = format!("{}/api/tags", base_url.trim_end_matches('/'));

    match reqwest::Client::new()
        .get(&url)
        .timeout(std::time::Duration::from_secs(2))
        .send()
        .await
    {
        Ok(resp) => {
            let available = resp.status().is_success();
            debug!("Ollama availability check: {}", available);
            available
        }
        Err(e) => {
            debug!("Ollama not available: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLLMClient;

    #[test]
    fn test_clients_are_shared_per_model() {
        let table = ModelTable::uniform(ModelConfig::new(Provider::Ollama, "llama3"));
        let clients = select_phase_clients(&table, None).unwrap();

        let first = clients.get(PhaseId::Discovery).unwrap();
        let last = clients.get(PhaseId::Final).unwrap();
        assert!(Arc::ptr_eq(&first, &last));
        assert_eq!(first.model_info(), Some("llama3".to_string()));
    }

    #[test]
    fn test_distinct_models_get_distinct_clients() {
        let mut table = ModelTable::uniform(ModelConfig::new(Provider::Ollama, "llama3"));
        table.set(PhaseId::Final, ModelConfig::new(Provider::Ollama, "qwen2.5-coder:7b"));
        let clients = select_phase_clients(&table, None).unwrap();

        let first = clients.get(PhaseId::Discovery).unwrap();
        let last = clients.get(PhaseId::Final).unwrap();
        assert!(!Arc::ptr_eq(&first, &last));
    }

    #[test]
    fn test_recording_wrapper() {
        let temp = tempfile::tempdir().unwrap();
        let settings = RecordingSettings {
            mode: RecordingMode::Auto,
            dir: temp.path().join("recs"),
        };
        let table = ModelTable::uniform(ModelConfig::new(Provider::Ollama, "llama3"));
        let clients = select_phase_clients(&table, Some(&settings)).unwrap();

        assert!(settings.dir.is_dir());
        assert_eq!(clients.get(PhaseId::Planning).unwrap().name(), "ollama");
    }

    #[test]
    fn test_uniform_override() {
        let mock: Arc<dyn LLMClient> = Arc::new(MockLLMClient::with_name("base"));
        let other: Arc<dyn LLMClient> = Arc::new(MockLLMClient::with_name("final"));
        let clients = PhaseClients::uniform(mock).with_client(PhaseId::Final, other);

        assert_eq!(clients.get(PhaseId::Discovery).unwrap().name(), "base");
        assert_eq!(clients.get(PhaseId::Final).unwrap().name(), "final");
    }
}
