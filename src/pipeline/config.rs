use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Applied to every single LLM call, fan-out calls included
    pub call_timeout: Duration,
    /// Output token limit unless the phase's model overrides it
    pub max_tokens: u32,
    pub max_file_bytes: usize,
    pub max_files_per_agent: usize,
    /// Run the rule-enhancement pass on the final rules
    pub enhance: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(300),
            max_tokens: 16_384,
            max_file_bytes: 64 * 1024,
            max_files_per_agent: 40,
            enhance: false,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn with_max_files_per_agent(mut self, max_files_per_agent: usize) -> Self {
        self.max_files_per_agent = max_files_per_agent;
        self
    }

    pub fn with_enhance(mut self, enhance: bool) -> Self {
        self.enhance = enhance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.call_timeout, Duration::from_secs(300));
        assert_eq!(config.max_tokens, 16_384);
        assert!(!config.enhance);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_call_timeout(Duration::from_secs(30))
            .with_max_tokens(1024)
            .with_max_file_bytes(2048)
            .with_max_files_per_agent(5)
            .with_enhance(true);

        assert_eq!(config.call_timeout, Duration::from_secs(30));
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.max_file_bytes, 2048);
        assert_eq!(config.max_files_per_agent, 5);
        assert!(config.enhance);
    }
}
