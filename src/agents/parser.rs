//! Parser for the `<analysis_plan>` block produced by the planning phase
//!
//! The planning model is asked for XML-ish markup, but its output is free text
//! and routinely malformed: missing closing tags, single-quoted attributes,
//! numbered tag names, stray prose. Parsing is therefore lenient and never
//! fails. Anything that cannot be read yields an empty plan, and the caller
//! decides what to do about it.

use super::AgentDefinition;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// How much of the plan could be recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanConfidence {
    /// No usable agent: missing container, no sections, or only unnamed ones
    None,
    /// At least one named agent section was read
    Parsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPlan {
    pub agents: Vec<AgentDefinition>,
    pub confidence: PlanConfidence,
}

impl ParsedPlan {
    pub fn empty() -> Self {
        Self {
            agents: Vec::new(),
            confidence: PlanConfidence::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

fn plan_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<analysis_plan\b[^>]*>").expect("valid regex"))
}

fn plan_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</analysis_plan\s*>").expect("valid regex"))
}

fn agent_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `agent`, `agent_3`, `agent-3`; the tag name must end at whitespace or `>`,
    // which keeps `<agents>`, `<agent_name>` and `<agent-role>` out
    RE.get_or_init(|| {
        Regex::new(r"(?i)<(agent(?:[_-]\d+)?)(\s[^>]*)?>").expect("valid regex")
    })
}

fn name_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bname\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

fn name_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<name>(.*?)</name>").expect("valid regex"))
}

fn description_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<description>(.*?)</description>").expect("valid regex"))
}

fn file_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<file_path>(.*?)</file_path>").expect("valid regex"))
}

/// Extracts agent definitions from planning output
///
/// Pure and deterministic: the same input always yields the same plan.
pub fn parse_agent_definitions(text: &str) -> ParsedPlan {
    let Some(open) = plan_open_regex().find(text) else {
        debug!("No <analysis_plan> container found in planning output");
        return ParsedPlan::empty();
    };

    let rest = &text[open.end()..];
    let body = match plan_close_regex().find(rest) {
        Some(close) => &rest[..close.start()],
        None => {
            debug!("<analysis_plan> is not closed, reading to end of text");
            rest
        }
    };

    let openings: Vec<_> = agent_open_regex().captures_iter(body).collect();
    let mut agents: Vec<AgentDefinition> = Vec::new();
    let mut seen = HashSet::new();

    for (idx, caps) in openings.iter().enumerate() {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        let next_start = openings
            .get(idx + 1)
            .and_then(|c| c.get(0))
            .map(|m| m.start())
            .unwrap_or(body.len());
        let section = section_body(&body[whole.end()..next_start], tag.as_str());

        let Some(name) = section_name(attrs, section) else {
            warn!(
                "Skipping <{}> section without a name in analysis plan",
                tag.as_str()
            );
            continue;
        };

        if !seen.insert(name.clone()) {
            warn!(agent = %name, "Skipping duplicate agent name in analysis plan");
            continue;
        }

        let description = description_regex()
            .captures(section)
            .and_then(|c| c.get(1))
            .map(|m| collapse_whitespace(&decode_entities(m.as_str())))
            .unwrap_or_default();

        let mut agent = AgentDefinition::new(name, description);
        for caps in file_path_regex().captures_iter(section) {
            if let Some(path) = caps.get(1).and_then(|m| clean_path(m.as_str())) {
                agent.add_file(path);
            }
        }

        debug!(
            agent = %agent.name,
            files = agent.files.len(),
            "Parsed agent definition"
        );
        agents.push(agent);
    }

    let confidence = if agents.is_empty() {
        PlanConfidence::None
    } else {
        PlanConfidence::Parsed
    };

    ParsedPlan { agents, confidence }
}

/// Cuts a section at its own closing tag when one exists before the next agent
///
/// Only the exact tag closes the section: `</agent_role>` inside `<agent>` does not.
fn section_body<'a>(candidate: &'a str, tag: &str) -> &'a str {
    let pattern = format!(r"(?i)</{}\s*>", regex::escape(tag));
    match Regex::new(&pattern) {
        Ok(closing) => match closing.find(candidate) {
            Some(end) => &candidate[..end.start()],
            None => candidate,
        },
        Err(_) => candidate,
    }
}

fn section_name(attrs: &str, section: &str) -> Option<String> {
    let from_attr = name_attr_regex().captures(attrs).and_then(|c| {
        c.get(1)
            .or_else(|| c.get(2))
            .map(|m| m.as_str().to_string())
    });

    let from_element = || {
        name_element_regex()
            .captures(section)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    from_attr
        .or_else(from_element)
        .map(|raw| collapse_whitespace(&decode_entities(&raw)))
        .filter(|name| !name.is_empty())
}

fn clean_path(raw: &str) -> Option<String> {
    let decoded = decode_entities(raw);
    let path = decoded
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();
    let path = path.strip_prefix("./").unwrap_or(path);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn names(plan: &ParsedPlan) -> Vec<&str> {
        plan.agents.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_two_agents_with_shared_file() {
        let text = r#"
Here is my plan.
<analysis_plan>
  <agent_1 name="A">
    <description>Looks at x</description>
    <file_assignments>
      <file_path>x.py</file_path>
    </file_assignments>
  </agent_1>
  <agent_2 name="B">
    <description>Looks at y and x</description>
    <file_assignments>
      <file_path>y.py</file_path>
      <file_path>x.py</file_path>
    </file_assignments>
  </agent_2>
</analysis_plan>
"#;
        let plan = parse_agent_definitions(text);

        assert_eq!(plan.confidence, PlanConfidence::Parsed);
        assert_eq!(names(&plan), vec!["A", "B"]);
        assert_eq!(plan.agents[0].files, vec!["x.py"]);
        assert_eq!(plan.agents[1].files, vec!["y.py", "x.py"]);
        assert_eq!(plan.agents[1].description, "Looks at y and x");
    }

    #[parameterized(
        no_container = { "Just some prose about the project." },
        empty_text = { "" },
        empty_container = { "<analysis_plan></analysis_plan>" },
        only_unnamed = { "<analysis_plan><agent><file_path>a.rs</file_path></agent></analysis_plan>" },
        agent_outside_container = { "<agent name=\"A\"><file_path>a.rs</file_path></agent>" },
    )]
    fn test_unusable_plans_are_empty(text: &str) {
        let plan = parse_agent_definitions(text);
        assert!(plan.is_empty());
        assert_eq!(plan.confidence, PlanConfidence::None);
    }

    #[parameterized(
        plain = { "<agent name=\"Core\">" , "</agent>" },
        underscore = { "<agent_7 name=\"Core\">", "</agent_7>" },
        dash = { "<agent-7 name=\"Core\">", "</agent-7>" },
        single_quotes = { "<agent name='Core'>", "</agent>" },
        upper_case = { "<AGENT name=\"Core\">", "</AGENT>" },
    )]
    fn test_agent_tag_variants(open: &str, close: &str) {
        let text = format!(
            "<analysis_plan>{}<file_path>src/lib.rs</file_path>{}</analysis_plan>",
            open, close
        );
        let plan = parse_agent_definitions(&text);
        assert_eq!(names(&plan), vec!["Core"]);
        assert_eq!(plan.agents[0].files, vec!["src/lib.rs"]);
    }

    #[test]
    fn test_missing_closing_tags_are_tolerated() {
        let text = r#"<analysis_plan>
<agent name="First">
<file_path>a.rs</file_path>
<agent name="Second">
<file_path>b.rs</file_path>
"#;
        let plan = parse_agent_definitions(text);
        assert_eq!(names(&plan), vec!["First", "Second"]);
        assert_eq!(plan.agents[0].files, vec!["a.rs"]);
        assert_eq!(plan.agents[1].files, vec!["b.rs"]);
    }

    #[test]
    fn test_name_element_fallback() {
        let text = "<analysis_plan><agent><name> API   Agent </name><file_path>api.rs</file_path></agent></analysis_plan>";
        let plan = parse_agent_definitions(text);
        assert_eq!(names(&plan), vec!["API Agent"]);
    }

    #[test]
    fn test_unnamed_section_skipped_others_kept() {
        let text = r#"<analysis_plan>
<agent><file_path>lost.rs</file_path></agent>
<agent name="Kept"><file_path>kept.rs</file_path></agent>
</analysis_plan>"#;
        let plan = parse_agent_definitions(text);
        assert_eq!(names(&plan), vec!["Kept"]);
        assert_eq!(plan.agents[0].files, vec!["kept.rs"]);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let text = r#"<analysis_plan>
<agent name="Same"><file_path>one.rs</file_path></agent>
<agent name="Same"><file_path>two.rs</file_path></agent>
</analysis_plan>"#;
        let plan = parse_agent_definitions(text);
        assert_eq!(plan.agents.len(), 1);
        assert_eq!(plan.agents[0].files, vec!["one.rs"]);
    }

    #[test]
    fn test_paths_are_cleaned_and_deduplicated() {
        let text = r#"<analysis_plan><agent name="A">
<file_path> `src/main.rs` </file_path>
<file_path>"src/main.rs"</file_path>
<file_path>./src/a&amp;b.rs</file_path>
<file_path>   </file_path>
</agent></analysis_plan>"#;
        let plan = parse_agent_definitions(text);
        assert_eq!(plan.agents[0].files, vec!["src/main.rs", "src/a&b.rs"]);
    }

    #[test]
    fn test_nested_tags_do_not_start_agents() {
        let text = r#"<analysis_plan><agents>
<agent name="Only"><agent_name>ignored</agent_name><file_path>x.rs</file_path></agent>
</agents></analysis_plan>"#;
        let plan = parse_agent_definitions(text);
        assert_eq!(names(&plan), vec!["Only"]);
        assert_eq!(plan.agents[0].files, vec!["x.rs"]);
    }

    #[parameterized(
        underscore_role = { "<agent_role>backend</agent_role>" },
        dashed_name = { "<agent-name>ignored</agent-name>" },
        dashed_description = { "<agent-description>API</agent-description>" },
        underscore_description = { "<agent_description>API</agent_description>" },
    )]
    fn test_agent_prefixed_children_keep_files(child: &str) {
        let text = format!(
            "<analysis_plan>\n<agent name=\"Only\">{}\n<file_assignments>\n\
             <file_path>x.rs</file_path>\n<file_path>y.rs</file_path>\n\
             </file_assignments>\n</agent>\n</analysis_plan>",
            child
        );
        let plan = parse_agent_definitions(&text);
        assert_eq!(names(&plan), vec!["Only"]);
        assert_eq!(plan.agents[0].files, vec!["x.rs", "y.rs"]);
    }

    #[test]
    fn test_closing_tag_matches_exact_numbered_tag() {
        let text = r#"<analysis_plan>
<agent_1 name="A"><file_path>a.rs</file_path></agent_10>
<file_path>b.rs</file_path></agent_1>
<agent_2 name="B"><file_path>c.rs</file_path></agent_2>
</analysis_plan>"#;
        let plan = parse_agent_definitions(text);
        assert_eq!(names(&plan), vec!["A", "B"]);
        assert_eq!(plan.agents[0].files, vec!["a.rs", "b.rs"]);
        assert_eq!(plan.agents[1].files, vec!["c.rs"]);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let text = "<analysis_plan><agent name=\"A\"><file_path>a</file_path></agent></analysis_plan>";
        assert_eq!(parse_agent_definitions(text), parse_agent_definitions(text));
    }
}
