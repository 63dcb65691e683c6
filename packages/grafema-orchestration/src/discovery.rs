//! File discovery.
//! A trait so tests and embedders can substitute a fixed file list; the
//! default implementation walks the filesystem via `walkdir`.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{GrafemaOrchestrationError, Result};

/// JS/TS source extensions the visitor understands.
const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx"];

/// Directories never worth descending into for a source-code graph.
const SKIP_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "coverage"];

#[async_trait]
pub trait FileDiscovery: Send + Sync {
    /// File paths relative to `project_path`, in an unspecified but stable
    /// order.
    async fn discover(&self, project_path: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Default)]
pub struct FilesystemDiscovery;

impl FilesystemDiscovery {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileDiscovery for FilesystemDiscovery {
    async fn discover(&self, project_path: &str) -> Result<Vec<String>> {
        let root = project_path.to_string();
        tokio::task::spawn_blocking(move || walk(&root))
            .await
            .map_err(|e| GrafemaOrchestrationError::Discovery(e.to_string()))?
    }
}

fn walk(project_path: &str) -> Result<Vec<String>> {
    let root = Path::new(project_path);
    if !root.exists() {
        return Err(GrafemaOrchestrationError::Discovery(format!(
            "project path does not exist: {project_path}"
        )));
    }

    let mut files = Vec::new();
    let walker = walkdir::WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.file_type().is_dir() {
            let name = entry.file_name().to_string_lossy();
            return !SKIP_DIRS.contains(&name.as_ref());
        }
        true
    });

    for entry in walker {
        let entry = entry.map_err(|e| GrafemaOrchestrationError::Discovery(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_source = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
            .unwrap_or(false);
        if !is_source {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        files.push(relative.to_string_lossy().replace('\\', "/"));
    }

    files.sort();
    Ok(files)
}
