use super::{render_tree, ExclusionSet};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Project path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Project path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to resolve project path {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub max_files: usize,
    pub tree_depth: usize,
    pub exclusions: ExclusionSet,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_files: 5_000,
            tree_depth: 6,
            exclusions: ExclusionSet::default(),
        }
    }
}

/// Files and tree of the project as seen at the start of a run
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    pub root: PathBuf,
    /// Relative, `/`-separated, sorted
    pub files: Vec<String>,
    pub tree: String,
    /// Set when the file cap stopped the walk early
    pub truncated: bool,
}

impl ProjectSnapshot {
    /// Snapshot built from known paths without touching the filesystem tree
    pub fn from_files(root: impl Into<PathBuf>, mut files: Vec<String>, tree_depth: usize) -> Self {
        let root = root.into();
        files.sort();
        files.dedup();
        let tree = render_tree(&project_name(&root), &files, tree_depth);
        Self {
            root,
            files,
            tree,
            truncated: false,
        }
    }

    pub fn name(&self) -> String {
        project_name(&self.root)
    }
}

fn project_name(root: &Path) -> String {
    root.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string()
}

/// Walks the project, honoring `.gitignore` and the exclusion set
pub fn scan_project(root: &Path, config: &ScanConfig) -> Result<ProjectSnapshot, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let root = root.canonicalize().map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let start = Instant::now();
    info!(
        root = %root.display(),
        max_files = config.max_files,
        "Scanning project"
    );

    let exclusions = Arc::new(config.exclusions.clone());
    let filter = Arc::clone(&exclusions);

    let mut files = Vec::new();
    let mut truncated = false;

    let walker = WalkBuilder::new(&root)
        .hidden(false)
        .git_ignore(true)
        .require_git(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy();
            !(is_dir && entry.depth() > 0 && filter.is_excluded_dir(&name))
        })
        .build();

    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(&root) else {
            continue;
        };
        if exclusions.is_excluded(rel) {
            continue;
        }

        if files.len() >= config.max_files {
            warn!(
                max_files = config.max_files,
                "Reached file limit, stopping scan"
            );
            truncated = true;
            break;
        }

        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        debug!(file = %rel, "Collected file");
        files.push(rel);
    }

    let mut snapshot = ProjectSnapshot::from_files(root, files, config.tree_depth);
    snapshot.truncated = truncated;

    info!(
        files = snapshot.files.len(),
        scan_time_ms = start.elapsed().as_millis() as u64,
        "Project scan completed"
    );

    Ok(snapshot)
}
