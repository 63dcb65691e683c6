//! The enrichment pipeline: a plugin system running in two
//! phases -- ANALYSIS (the visitor + builder of [`crate::visitor`] and
//! [`crate::builder`], which this module does not re-model) and ENRICHMENT
//! (derives edges/metadata over an already-written graph). This module
//! covers the [`Plugin`] contract, the dependency-ordered [`runner`], and
//! the two archetypal ENRICHMENT plugins.

pub mod cardinality;
pub mod external_call_resolver;
pub mod runner;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::GraphStore;

/// `phase ∈ {ANALYSIS, ENRICHMENT}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Analysis,
    Enrichment,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Analysis => "ANALYSIS",
            Phase::Enrichment => "ENRICHMENT",
        }
    }
}

/// `{ name, phase, dependencies, consumes, produces }`.
#[derive(Debug, Clone)]
pub struct PluginMetadata {
    pub name: String,
    pub phase: Phase,
    pub dependencies: Vec<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>, phase: Phase) -> Self {
        Self {
            name: name.into(),
            phase,
            dependencies: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
        }
    }

    pub fn depends_on(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn produces(mut self, edges: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.produces = edges.into_iter().map(Into::into).collect();
        self
    }
}

/// `{ phase, currentPlugin, message, totalFiles, processedFiles }`.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: String,
    pub current_plugin: String,
    pub message: String,
    pub total_files: usize,
    pub processed_files: usize,
}

/// A progress callback is a capability, not a channel: a
/// plain function reference the enrichment loop calls directly, never a
/// message-passing subsystem. Contractually non-suspending.
pub type OnProgress = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// `{ graph, projectPath, config, onProgress? }`.
pub struct PluginContext {
    pub graph: Arc<dyn GraphStore>,
    pub project_path: String,
    pub config: Value,
    pub on_progress: Option<OnProgress>,
}

impl PluginContext {
    pub fn new(graph: Arc<dyn GraphStore>, project_path: impl Into<String>) -> Self {
        Self {
            graph,
            project_path: project_path.into(),
            config: Value::Null,
            on_progress: None,
        }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn with_progress(mut self, on_progress: OnProgress) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Throttled to every Nth iteration, always firing on the last:
    /// `processed % 10 == 0 || processed == total`.
    pub fn report_progress(&self, phase: &str, plugin: &str, message: &str, total: usize, processed: usize) {
        if processed % 10 != 0 && processed != total {
            return;
        }
        if let Some(cb) = &self.on_progress {
            cb(ProgressEvent {
                phase: phase.to_string(),
                current_plugin: plugin.to_string(),
                message: message.to_string(),
                total_files: total,
                processed_files: processed,
            });
        }
    }
}

/// `{ success, metadata, errors }`.
#[derive(Debug, Clone, Default)]
pub struct PluginResult {
    pub success: bool,
    pub metadata: Map<String, Value>,
    pub errors: Vec<String>,
}

impl PluginResult {
    pub fn ok(metadata: Map<String, Value>) -> Self {
        Self {
            success: true,
            metadata,
            errors: Vec::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            metadata: Map::new(),
            errors: vec![error.into()],
        }
    }
}

/// The plugin contract exposed to external plugin authors.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    fn metadata(&self) -> PluginMetadata;
    async fn execute(&self, ctx: &PluginContext) -> PluginResult;
}
