//! Model table loading: defaults, TOML file and environment precedence

use rules_architect::llm::ReasoningMode;
use rules_architect::{ConfigError, ModelTable, PhaseId, Provider};
use serial_test::serial;
use std::env;
use std::fs;

const PHASE3_ENV: &str = "RULES_ARCHITECT_PHASE3_MODEL";

#[test]
#[serial]
fn test_env_overrides_file_which_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models.toml");
    fs::write(
        &path,
        r#"
[phase3]
provider = "gemini"
model = "gemini-2.0-flash"
reasoning = "disabled"

[phase4]
provider = "deepseek"
model = "deepseek-reasoner"
"#,
    )
    .unwrap();

    env::remove_var(PHASE3_ENV);
    let from_file = ModelTable::load(Some(&path)).unwrap();

    env::set_var(PHASE3_ENV, "xai:grok-3@medium");
    let with_env = ModelTable::load(Some(&path));
    env::remove_var(PHASE3_ENV);
    let with_env = with_env.unwrap();

    let defaults = ModelTable::default();
    assert_eq!(from_file.get(PhaseId::Discovery), defaults.get(PhaseId::Discovery));
    assert_eq!(from_file.get(PhaseId::Analysis).provider, Provider::Gemini);
    assert_eq!(from_file.get(PhaseId::Analysis).reasoning, ReasoningMode::Disabled);
    assert_eq!(from_file.get(PhaseId::Synthesis).model, "deepseek-reasoner");

    let analysis = with_env.get(PhaseId::Analysis);
    assert_eq!(analysis.provider, Provider::Xai);
    assert_eq!(analysis.model, "grok-3");
    assert_eq!(analysis.reasoning, ReasoningMode::Medium);
    assert_eq!(with_env.get(PhaseId::Synthesis).provider, Provider::DeepSeek);
}

#[test]
#[serial]
fn test_invalid_env_spec_is_rejected() {
    env::set_var(PHASE3_ENV, "nonsense");
    let result = ModelTable::load(Some(std::path::Path::new("/dev/null")));
    env::remove_var(PHASE3_ENV);

    assert!(matches!(result, Err(ConfigError::InvalidModelSpec(_))));
}

#[test]
#[serial]
fn test_provider_typo_gets_suggestion() {
    env::remove_var(PHASE3_ENV);
    let err = ModelTable::from_toml_str("[phase1]\nprovider = \"antropic\"\n").unwrap_err();
    assert!(err.to_string().contains("did you mean 'anthropic'"));
}
