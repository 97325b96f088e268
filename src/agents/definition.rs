use serde::{Deserialize, Serialize};

/// One Phase 3 analysis agent: a named role and the files it should read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    pub description: String,
    /// Relative paths, deduplicated, in the order they were assigned
    pub files: Vec<String>,
}

impl AgentDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            files: Vec::new(),
        }
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for file in files {
            self.add_file(file);
        }
        self
    }

    /// Adds a path unless it is already assigned; returns whether it was added
    pub fn add_file(&mut self, file: impl Into<String>) -> bool {
        let file = file.into();
        if self.files.contains(&file) {
            return false;
        }
        self.files.push(file);
        true
    }
}
