//! Project inspection: scanning, exclusions, tree rendering and file contents

mod content;
mod exclusions;
mod scanner;
mod tree;

pub use content::{find_manifests, read_file_capped, render_file_contents, FileContent, MANIFEST_FILES};
pub use exclusions::ExclusionSet;
pub use scanner::{scan_project, ProjectSnapshot, ScanConfig, ScanError};
pub use tree::render_tree;
