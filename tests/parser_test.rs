//! Agent plan parsing and agent selection through the public API

use rules_architect::agents::{default_agents, PlanConfidence};
use rules_architect::{parse_agent_definitions, select_agents, AgentSource};

#[test]
fn test_two_agents_sharing_a_file() {
    let text = r#"
<analysis_plan>
<agent_1 name="A">
<description>First</description>
<file_assignments>
<file_path>x.py</file_path>
</file_assignments>
</agent_1>
<agent_2 name="B">
<description>Second</description>
<file_assignments>
<file_path>y.py</file_path>
<file_path>x.py</file_path>
</file_assignments>
</agent_2>
</analysis_plan>
"#;

    let plan = parse_agent_definitions(text);

    assert_eq!(plan.confidence, PlanConfidence::Parsed);
    assert_eq!(plan.agents.len(), 2);
    assert_eq!(plan.agents[0].name, "A");
    assert_eq!(plan.agents[0].files, vec!["x.py"]);
    assert_eq!(plan.agents[1].name, "B");
    assert_eq!(plan.agents[1].files, vec!["y.py", "x.py"]);
}

#[test]
fn test_missing_container_selects_fallback_agents() {
    let files = vec!["main.py".to_string(), "util.py".to_string()];
    let plan = parse_agent_definitions("Agent 1 should read main.py, agent 2 util.py.");

    assert!(plan.is_empty());
    assert_eq!(plan.confidence, PlanConfidence::None);

    let selection = select_agents(plan, &files);
    assert_eq!(selection.source, AgentSource::Fallback);
    assert_eq!(selection.agents, default_agents(&files));
    assert!(selection.agents.iter().all(|a| a.files == files));
}

#[test]
fn test_parsed_plan_is_used_as_is() {
    let files = vec!["x.py".to_string()];
    let plan = parse_agent_definitions(
        "<analysis_plan><agent name=\"Only\"><file_path>x.py</file_path></agent></analysis_plan>",
    );

    let selection = select_agents(plan, &files);
    assert_eq!(selection.source, AgentSource::Planned);
    assert_eq!(selection.agents.len(), 1);
    assert_eq!(selection.agents[0].name, "Only");
}

#[test]
fn test_parsing_same_text_twice_is_identical() {
    let text = "<analysis_plan>\n<agent_1 name='Core'>\n<file_path>./src/lib.rs</file_path>\n";
    assert_eq!(parse_agent_definitions(text), parse_agent_definitions(text));
}
