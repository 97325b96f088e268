use std::collections::BTreeSet;
use std::path::Path;

const DEFAULT_DIRECTORIES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".next",
    ".nuxt",
    ".cache",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    ".venv",
    "venv",
    "env",
    "__pycache__",
    "node_modules",
    "bower_components",
    "vendor",
    "target",
    "dist",
    "build",
    "out",
    "coverage",
    "phases_output",
];

const DEFAULT_FILES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    ".cursorrules",
    ".cursorignore",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "poetry.lock",
    "Pipfile.lock",
    "composer.lock",
    "Gemfile.lock",
    "go.sum",
];

const DEFAULT_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "webp", "pdf", "zip", "tar", "gz", "tgz",
    "bz2", "xz", "7z", "rar", "jar", "war", "class", "exe", "dll", "so", "dylib", "o", "a",
    "pyc", "pyo", "woff", "woff2", "ttf", "eot", "otf", "mp3", "mp4", "wav", "mov", "avi",
    "db", "sqlite", "min.js", "map",
];

/// Directory names, file names and extensions left out of the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    directories: BTreeSet<String>,
    files: BTreeSet<String>,
    extensions: BTreeSet<String>,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            directories: set(DEFAULT_DIRECTORIES),
            files: set(DEFAULT_FILES),
            extensions: set(DEFAULT_EXTENSIONS),
        }
    }
}

impl ExclusionSet {
    /// Defaults plus a comma-separated user list such as `docs,*.csv,fixtures/`
    pub fn with_user_list(list: &str) -> Self {
        let mut set = Self::default();
        for entry in list.split(',') {
            set.add(entry);
        }
        set
    }

    /// `*.ext` excludes an extension, `name/` a directory, anything else a
    /// file or directory with that exact name
    pub fn add(&mut self, entry: &str) {
        let entry = entry.trim();
        if entry.is_empty() {
            return;
        }

        if let Some(ext) = entry.strip_prefix("*.") {
            self.extensions.insert(ext.to_lowercase());
        } else if let Some(dir) = entry.strip_suffix('/') {
            self.directories.insert(dir.to_string());
        } else {
            self.directories.insert(entry.to_string());
            self.files.insert(entry.to_string());
        }
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.directories.contains(name)
    }

    pub fn is_excluded_file(&self, name: &str) -> bool {
        if self.files.contains(name) {
            return true;
        }
        let lower = name.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }

    /// Checks a relative path: any excluded directory component or an excluded file name
    pub fn is_excluded(&self, rel_path: &Path) -> bool {
        let components: Vec<_> = rel_path
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        let Some((file, dirs)) = components.split_last() else {
            return false;
        };
        dirs.iter().any(|d| self.is_excluded_dir(d)) || self.is_excluded_file(file)
    }

    /// Contents of the generated `.cursorignore`
    pub fn to_cursorignore(&self) -> String {
        let mut out = String::from("# Generated by rules-architect\n\n# Directories\n");
        for dir in &self.directories {
            out.push_str(dir);
            out.push_str("/\n");
        }
        out.push_str("\n# Files\n");
        for file in &self.files {
            out.push_str(file);
            out.push('\n');
        }
        out.push_str("\n# Extensions\n");
        for ext in &self.extensions {
            out.push_str("*.");
            out.push_str(ext);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let set = ExclusionSet::default();
        assert!(set.is_excluded(Path::new("node_modules/react/index.js")));
        assert!(set.is_excluded(Path::new("assets/logo.PNG")));
        assert!(set.is_excluded(Path::new("Cargo.lock")));
        assert!(!set.is_excluded(Path::new("src/main.rs")));
    }

    #[test]
    fn test_user_list() {
        let set = ExclusionSet::with_user_list("docs, *.csv ,fixtures/,,");
        assert!(set.is_excluded(Path::new("docs/guide.md")));
        assert!(set.is_excluded(Path::new("docs")));
        assert!(set.is_excluded(Path::new("data/table.csv")));
        assert!(set.is_excluded(Path::new("tests/fixtures/a.json")));
        assert!(!set.is_excluded(Path::new("src/docs.rs")));
    }

    #[test]
    fn test_cursorignore() {
        let set = ExclusionSet::with_user_list("secrets");
        let text = set.to_cursorignore();
        assert!(text.contains("node_modules/\n"));
        assert!(text.contains("secrets/\n"));
        assert!(text.contains("*.png\n"));
    }
}
