//! Reading project files into prompts

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path};
use tracing::debug;

/// Build and dependency manifests shown to the discovery agents
pub const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "requirements.txt",
    "setup.py",
    "setup.cfg",
    "Pipfile",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "Gemfile",
    "composer.json",
    "mix.exs",
    "pubspec.yaml",
    "Package.swift",
    "CMakeLists.txt",
    "Makefile",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "tsconfig.json",
    "deno.json",
];

const BINARY_SNIFF_BYTES: usize = 8_192;

/// Manifest paths among the project's files, in project order
pub fn find_manifests(files: &[String]) -> Vec<String> {
    files
        .iter()
        .filter(|path| {
            let name = path.rsplit('/').next().unwrap_or(path);
            MANIFEST_FILES.contains(&name) || name.ends_with(".csproj")
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text { content: String, truncated: bool },
    Binary,
    Missing,
    Unreadable(String),
}

/// Reads at most `max_bytes` of a project file
///
/// Paths that are absolute or climb out of `root` are reported as missing.
pub fn read_file_capped(root: &Path, rel_path: &str, max_bytes: usize) -> FileContent {
    let rel = Path::new(rel_path);
    if rel.is_absolute()
        || rel
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return FileContent::Missing;
    }

    let path = root.join(rel);
    if !path.is_file() {
        return FileContent::Missing;
    }

    let mut buf = Vec::with_capacity(max_bytes.min(1 << 20) + 1);
    let read = File::open(&path).and_then(|file| {
        file.take(max_bytes as u64 + 1).read_to_end(&mut buf)
    });
    if let Err(e) = read {
        return FileContent::Unreadable(e.to_string());
    }

    if buf[..buf.len().min(BINARY_SNIFF_BYTES)].contains(&0) {
        return FileContent::Binary;
    }

    let truncated = buf.len() > max_bytes;
    buf.truncate(max_bytes);
    FileContent::Text {
        content: String::from_utf8_lossy(&buf).into_owned(),
        truncated,
    }
}

/// Markdown block with the contents of up to `max_files` files
///
/// Missing, binary and unreadable files get a one-line note instead of content.
pub fn render_file_contents(
    root: &Path,
    files: &[String],
    max_files: usize,
    max_bytes: usize,
) -> String {
    let mut out = String::new();

    for rel in files.iter().take(max_files) {
        match read_file_capped(root, rel, max_bytes) {
            FileContent::Text { content, truncated } => {
                out.push_str(&format!("### {}\n```\n{}", rel, content));
                if !content.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("```\n");
                if truncated {
                    out.push_str(&format!("_(truncated to {} bytes)_\n", max_bytes));
                }
                out.push('\n');
            }
            FileContent::Binary => out.push_str(&format!("### {}\n_(binary file skipped)_\n\n", rel)),
            FileContent::Missing => {
                debug!(file = %rel, "Assigned file not found");
                out.push_str(&format!("### {}\n_(file not found)_\n\n", rel));
            }
            FileContent::Unreadable(error) => {
                out.push_str(&format!("### {}\n_(could not read file: {})_\n\n", rel, error))
            }
        }
    }

    if files.len() > max_files {
        out.push_str(&format!(
            "_({} more assigned files not shown)_\n",
            files.len() - max_files
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_manifests() {
        let files: Vec<String> = ["src/main.rs", "Cargo.toml", "web/package.json", "App/App.csproj"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            find_manifests(&files),
            vec!["Cargo.toml", "web/package.json", "App/App.csproj"]
        );
    }

    #[test]
    fn test_read_file_capped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "hello world").unwrap();
        fs::write(dir.path().join("b.bin"), [b'x', 0, b'y']).unwrap();

        assert_eq!(
            read_file_capped(dir.path(), "a.txt", 5),
            FileContent::Text {
                content: "hello".to_string(),
                truncated: true
            }
        );
        assert_eq!(
            read_file_capped(dir.path(), "a.txt", 100),
            FileContent::Text {
                content: "hello world".to_string(),
                truncated: false
            }
        );
        assert_eq!(read_file_capped(dir.path(), "b.bin", 100), FileContent::Binary);
        assert_eq!(read_file_capped(dir.path(), "nope.txt", 100), FileContent::Missing);
        assert_eq!(read_file_capped(dir.path(), "../a.txt", 100), FileContent::Missing);
    }

    #[test]
    fn test_render_file_contents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        fs::write(dir.path().join("b.rs"), "fn b() {}").unwrap();

        let files = vec!["a.rs".to_string(), "gone.rs".to_string(), "b.rs".to_string()];
        let rendered = render_file_contents(dir.path(), &files, 2, 1024);

        assert!(rendered.contains("### a.rs\n```\nfn a() {}\n```"));
        assert!(rendered.contains("### gone.rs\n_(file not found)_"));
        assert!(!rendered.contains("fn b()"));
        assert!(rendered.contains("1 more assigned files not shown"));
    }
}
