use crate::project::ExclusionSet;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const RULES_FILE: &str = ".cursorrules";
pub const IGNORE_FILE: &str = ".cursorignore";

/// Hook for the optional rule-enhancement pass
///
/// Enhancement is an external subsystem; here the rules pass through unchanged.
pub fn enhance_rules(rules: &str, enabled: bool) -> String {
    if enabled {
        debug!("Rule enhancement requested; no enhancer configured, rules unchanged");
    }
    rules.to_string()
}

pub fn write_rules(output_dir: &Path, rules: &str) -> Result<PathBuf> {
    let path = output_dir.join(RULES_FILE);
    let mut content = rules.trim_end().to_string();
    content.push('\n');
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote cursor rules");
    Ok(path)
}

pub fn write_cursorignore(output_dir: &Path, exclusions: &ExclusionSet) -> Result<PathBuf> {
    let path = output_dir.join(IGNORE_FILE);
    std::fs::write(&path, exclusions.to_cursorignore())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote cursor ignore file");
    Ok(path)
}
