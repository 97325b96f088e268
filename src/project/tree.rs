use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct Node {
    dirs: BTreeMap<String, Node>,
    files: BTreeSet<String>,
}

impl Node {
    fn insert(&mut self, path: &str) {
        let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some(file) = parts.pop() else {
            return;
        };
        let mut node = self;
        for dir in parts {
            node = node.dirs.entry(dir.to_string()).or_default();
        }
        node.files.insert(file.to_string());
    }
}

/// Renders relative file paths as an indented tree, directories first
///
/// Directories deeper than `max_depth` are collapsed to `name/ ...`.
pub fn render_tree(root_name: &str, files: &[String], max_depth: usize) -> String {
    let mut root = Node::default();
    for file in files {
        root.insert(file);
    }

    let mut out = format!("{}/\n", root_name.trim_end_matches('/'));
    render_node(&root, "", 1, max_depth.max(1), &mut out);
    out
}

fn render_node(node: &Node, prefix: &str, depth: usize, max_depth: usize, out: &mut String) {
    let total = node.dirs.len() + node.files.len();
    let entries = node
        .dirs
        .iter()
        .map(|(name, child)| (name.as_str(), Some(child)))
        .chain(node.files.iter().map(|name| (name.as_str(), None)));

    for (idx, (name, child)) in entries.enumerate() {
        let last = idx + 1 == total;
        let branch = if last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(name);

        match child {
            Some(_) if depth >= max_depth => out.push_str("/ ...\n"),
            Some(child) => {
                out.push_str("/\n");
                let extension = if last { "    " } else { "│   " };
                render_node(child, &format!("{}{}", prefix, extension), depth + 1, max_depth, out);
            }
            None => out.push('\n'),
        }
    }
}
