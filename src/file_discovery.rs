use crate::config::PathsConfig;
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory of every Claude root that holds project logs
pub const PROJECTS_SUBDIR: &str = "projects";

const LOG_PATTERN: &str = "**/*.jsonl";

/// Finds Claude Code JSONL logs under the known roots
#[derive(Debug, Clone)]
pub struct LogDiscovery {
    roots: Vec<PathBuf>,
}

impl LogDiscovery {
    /// Default roots plus any extra roots from configuration:
    /// `<config_home>/claude`, `<home>/.claude`, then each extra root.
    pub fn from_config(paths: &PathsConfig) -> Self {
        let mut claude_roots = vec![
            paths.config_home.join("claude"),
            paths.home.join(".claude"),
        ];
        claude_roots.extend(paths.extra_roots.iter().cloned());
        Self::with_claude_roots(claude_roots)
    }

    /// Claude roots whose `projects` subdirectory is searched.
    pub fn with_claude_roots<I>(claude_roots: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self {
            roots: claude_roots
                .into_iter()
                .map(|root| root.join(PROJECTS_SUBDIR))
                .collect(),
        }
    }

    /// Directories searched for logs, in order
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// All `*.jsonl` files beneath every root.
    ///
    /// Missing or unreadable roots contribute nothing. The same file reached
    /// through two roots is listed twice.
    pub fn discover_log_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for root in &self.roots {
            let found = find_jsonl_files(root);
            debug!(root = %root.display(), files = found.len(), "Scanned log root");
            files.extend(found);
        }
        files
    }
}

fn find_jsonl_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    // Escape the root so directory names containing glob metacharacters match literally
    let pattern = Path::new(&Pattern::escape(&root.to_string_lossy())).join(LOG_PATTERN);
    let Ok(paths) = glob(&pattern.to_string_lossy()) else {
        return Vec::new();
    };

    paths
        .flatten()
        .filter(|path| path.is_file())
        .map(|path| std::path::absolute(&path).unwrap_or(path))
        .collect()
}
